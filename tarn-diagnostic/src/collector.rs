//! Diagnostic collection.

use crate::{Diagnostic, Location, Range, RelatedInformation, Severity};
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/**
A sink for diagnostics.

Reporting never interrupts the caller; passes keep going after an error.
*/
pub trait DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic);

    fn report_error(
        &mut self,
        location: Location,
        message: String,
        related: Vec<RelatedInformation>,
    ) {
        self.report(Diagnostic::new(location, Severity::Error, message, related))
    }

    fn report_warning(
        &mut self,
        location: Location,
        message: String,
        related: Vec<RelatedInformation>,
    ) {
        self.report(Diagnostic::new(location, Severity::Warning, message, related))
    }

    fn report_info(
        &mut self,
        location: Location,
        message: String,
        related: Vec<RelatedInformation>,
    ) {
        self.report(Diagnostic::new(
            location,
            Severity::Information,
            message,
            related,
        ))
    }

    fn report_hint(
        &mut self,
        location: Location,
        message: String,
        related: Vec<RelatedInformation>,
    ) {
        self.report(Diagnostic::new(location, Severity::Hint, message, related))
    }
}

/// An ordered collector for a single compilation unit.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics {
            items: Vec::new(),
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Diagnostics in the order they were reported.
    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Diagnostic> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }
}

impl DiagnosticCollector for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Information | Severity::Hint => {}
        }
        self.items.push(diagnostic);
    }
}

/**
An append-only collector shared between compilation units running in parallel.

Each unit's diagnostics stay in the order that unit reported them; the
interleaving between units is unspecified.
*/
#[derive(Debug, Default)]
pub struct ConcurrentDiagnostics {
    items: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
    warning_count: AtomicUsize,
}

impl ConcurrentDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every diagnostic a unit collected, as one contiguous block.
    pub fn append(&self, diagnostics: Diagnostics) {
        self.error_count
            .fetch_add(diagnostics.error_count(), Ordering::Relaxed);
        self.warning_count
            .fetch_add(diagnostics.warning_count(), Ordering::Relaxed);
        self.items.lock().extend(diagnostics.into_items());
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.items.lock().clone()
    }

    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count.load(Ordering::Relaxed)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }
}

impl DiagnosticCollector for &ConcurrentDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => {
                self.error_count.fetch_add(1, Ordering::Relaxed);
            }
            Severity::Warning => {
                self.warning_count.fetch_add(1, Ordering::Relaxed);
            }
            Severity::Information | Severity::Hint => {}
        }
        self.items.lock().push(diagnostic);
    }
}

/// Reports diagnostics for ranges within one source.
pub struct LocalDiagnosticReporter<'a> {
    source_uri: Arc<str>,
    collector: &'a mut dyn DiagnosticCollector,
}

impl<'a> LocalDiagnosticReporter<'a> {
    pub fn new(source_uri: Arc<str>, collector: &'a mut dyn DiagnosticCollector) -> Self {
        LocalDiagnosticReporter {
            source_uri,
            collector,
        }
    }

    pub fn source_uri(&self) -> &Arc<str> {
        &self.source_uri
    }

    pub fn location(&self, range: Range) -> Location {
        Location::new(self.source_uri.clone(), range)
    }

    pub fn report_error(
        &mut self,
        range: Range,
        message: String,
        related: Vec<RelatedInformation>,
    ) {
        let location = self.location(range);
        self.collector.report_error(location, message, related)
    }

    pub fn report_warning(
        &mut self,
        range: Range,
        message: String,
        related: Vec<RelatedInformation>,
    ) {
        let location = self.location(range);
        self.collector.report_warning(location, message, related)
    }

    pub fn report_info(&mut self, range: Range, message: String, related: Vec<RelatedInformation>) {
        let location = self.location(range);
        self.collector.report_info(location, message, related)
    }

    pub fn report_hint(&mut self, range: Range, message: String, related: Vec<RelatedInformation>) {
        let location = self.location(range);
        self.collector.report_hint(location, message, related)
    }
}
