pub mod render;
pub mod terminal;

/// Where the app draws its pages and asks the user things.
pub trait Surface {
    fn render(&mut self, lines: &[String]);
    /// Blocking user-facing message.
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, prompt: &str) -> bool;
}
