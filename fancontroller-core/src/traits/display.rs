//! Display sink trait

/// Text sink for status output
///
/// Layout and drawing belong to the implementation; the caller only hands
/// over finished lines.
pub trait DisplaySink {
    /// Show one line of status text
    fn render(&mut self, text: &str);
}

impl<D: DisplaySink + ?Sized> DisplaySink for &mut D {
    fn render(&mut self, text: &str) {
        (**self).render(text)
    }
}
