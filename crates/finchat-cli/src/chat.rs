//! Terminal chat loop

use finchat_runtime::{ChatSession, StreamRenderer};
use std::io::{self, BufRead, Write};

const FINANCIAL_DATA_ACTIVITY: &str = "🔍 Accessing financial data...";
const WEB_SEARCH_ACTIVITY: &str = "🌐 Searching the web...";

/// Label shown while a tool is running
fn activity_label(tool_name: &str) -> Option<&'static str> {
    match tool_name {
        "get_company_overview" | "get_stock_price" | "get_stock_news_and_sentiment" => {
            Some(FINANCIAL_DATA_ACTIVITY)
        }
        "web_search" => Some(WEB_SEARCH_ACTIVITY),
        _ => None,
    }
}

/// Prints answers as they grow
///
/// The streamer hands over the whole buffer each time, so only the part not
/// yet printed is written.
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    shown: String,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: String::new(),
        }
    }

    /// End the current answer
    pub fn finish(&mut self) {
        if !self.shown.is_empty() {
            let _ = writeln!(self.out);
        }
        let _ = writeln!(self.out);
        let _ = self.out.flush();
        self.shown.clear();
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> StreamRenderer for TerminalRenderer<W> {
    fn render(&mut self, text: &str) {
        if let Some(rest) = text.strip_prefix(self.shown.as_str()) {
            let _ = write!(self.out, "{rest}");
        } else {
            // Not a continuation; start on a fresh line
            let _ = write!(self.out, "\n{text}");
        }
        let _ = self.out.flush();
        self.shown = text.to_string();
    }

    fn tool_activity(&mut self, tool_name: &str) {
        if let Some(label) = activity_label(tool_name) {
            let _ = writeln!(self.out, "{label}");
            let _ = self.out.flush();
        }
    }
}

fn print_banner(session: &ChatSession) {
    println!("📈 Financial Research Assistant");
    println!("Commands: /clear starts over, /exit quits\n");

    if let Some(greeting) = session.history().first().and_then(|m| m.text()) {
        println!("{greeting}\n");
    }
    if let Some(reason) = session.blocked_reason() {
        println!("⚠️  {reason}\n");
    }
}

/// Run the chat loop until `/exit` or end of input
pub async fn run(mut session: ChatSession) -> anyhow::Result<()> {
    print_banner(&session);

    let stdin = io::stdin();
    let mut renderer = TerminalRenderer::new(io::stdout());

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!("\nGoodbye!");
            break;
        }

        let prompt = input.trim();
        match prompt {
            "" => continue,
            "/exit" | "/quit" => {
                println!("Goodbye!");
                break;
            }
            "/clear" => {
                session.clear();
                println!("Conversation cleared.\n");
                continue;
            }
            _ => {}
        }

        println!();
        session.submit(prompt, &mut renderer).await;
        renderer.finish();
    }

    Ok(())
}
