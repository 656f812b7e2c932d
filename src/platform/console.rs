use super::traits::MessagingTransport;
use std::future::Future;
use std::pin::Pin;

/// Prints each segment to stdout instead of sending it. Always available.
pub struct ConsoleTransport;

impl ConsoleTransport {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn render_outbox(destination: &str, segments: &[String]) -> String {
    let total = segments.len();
    let mut out = format!("To: {destination}\n");
    for (index, segment) in segments.iter().enumerate() {
        if total > 1 {
            out.push_str(&format!("--- part {}/{total} ---\n", index + 1));
        }
        out.push_str(segment);
        out.push('\n');
    }
    out
}

impl MessagingTransport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    fn send<'a>(
        &'a self,
        destination: &'a str,
        segments: &'a [String],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            print!("{}", render_outbox(destination, segments));
            Ok(())
        })
    }
}
