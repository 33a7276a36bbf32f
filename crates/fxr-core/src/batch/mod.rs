//! Batch processing of invoice documents.
//!
//! Every document is decoded and extracted independently. A failing document
//! becomes a [`BatchOutcome::Failure`] and never stops its siblings; only a
//! failure to enumerate the documents aborts a batch.

mod source;

pub use source::{DirectorySource, DocumentSource};

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{EnumerationError, FxrError};
use crate::invoice::{InvoiceExtractor, RateExtractor};
use crate::models::config::FxrConfig;
use crate::models::rates::{BatchOutcome, DocumentRef, ExtractionResult, RawDocument};
use crate::pdf::DocumentDecoder;

/// Reason reported for a document that exceeded the time limit.
pub const TIMEOUT_REASON: &str = "timeout";

/// Processes documents concurrently, preserving input order in the output.
///
/// A decode holds one of `concurrency` permits until its blocking worker
/// returns, so a timed-out document keeps its slot while it drains.
pub struct BatchProcessor<D> {
    decoder: Arc<D>,
    extractor: Arc<RateExtractor>,
    concurrency: usize,
    limiter: Arc<Semaphore>,
    timeout: Option<Duration>,
}

impl<D: DocumentDecoder + 'static> BatchProcessor<D> {
    /// Create a processor running up to 4 documents at once, without a timeout.
    pub fn new(decoder: D, extractor: RateExtractor) -> Self {
        Self {
            decoder: Arc::new(decoder),
            extractor: Arc::new(extractor),
            concurrency: 4,
            limiter: Arc::new(Semaphore::new(4)),
            timeout: None,
        }
    }

    /// Apply the batch section of the configuration.
    pub fn with_config(self, config: &FxrConfig) -> Self {
        self.with_concurrency(config.batch.concurrency)
            .with_timeout(config.timeout())
    }

    /// Set the maximum number of documents in flight (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self.limiter = Arc::new(Semaphore::new(self.concurrency));
        self
    }

    /// Set the per-document time limit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Enumerate `source` and process every document it lists.
    pub async fn run<S: DocumentSource>(
        &self,
        source: &S,
    ) -> Result<Vec<BatchOutcome>, EnumerationError> {
        let documents = source.list()?;
        Ok(self.process_all(documents).await)
    }

    /// Process `documents`, returning one outcome per document in input order.
    pub async fn process_all(&self, documents: Vec<DocumentRef>) -> Vec<BatchOutcome> {
        let total = documents.len();
        info!("Processing {} documents ({} at a time)", total, self.concurrency);

        let outcomes: Vec<BatchOutcome> = stream::iter(documents)
            .map(|document| self.process_one(document))
            .buffered(self.concurrency)
            .collect()
            .await;

        let ok = outcomes.iter().filter(|o| o.is_success()).count();
        info!("Processed {} documents ({} ok, {} failed)", total, ok, total - ok);
        outcomes
    }

    async fn process_one(&self, document: DocumentRef) -> BatchOutcome {
        let name = document.name.clone();
        let decoder = Arc::clone(&self.decoder);
        let extractor = Arc::clone(&self.extractor);

        let permit = match Arc::clone(&self.limiter).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => return BatchOutcome::failure(name, format!("worker failed: {}", e)),
        };

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            decode_and_extract(&*decoder, &extractor, document)
        });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("Timed out processing {} after {:?}", name, limit);
                    return BatchOutcome::failure(name, TIMEOUT_REASON);
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(result)) => {
                debug!("Extracted {}", name);
                BatchOutcome::Success(result)
            }
            Ok(Err(e)) => {
                warn!("Failed to process {}: {}", name, e);
                BatchOutcome::failure(name, e.reason())
            }
            Err(e) => {
                warn!("Worker for {} did not finish: {}", name, e);
                BatchOutcome::failure(name, format!("worker failed: {}", e))
            }
        }
    }
}

fn decode_and_extract<D: DocumentDecoder + ?Sized>(
    decoder: &D,
    extractor: &RateExtractor,
    document: DocumentRef,
) -> Result<ExtractionResult, FxrError> {
    let text = decoder.decode(&document)?;
    let raw = RawDocument::from_text(document.name, &text);
    Ok(extractor.extract(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::pdf;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves document text from memory; names without text fail to decode.
    #[derive(Default)]
    struct MemoryDecoder {
        texts: HashMap<String, String>,
        delay: Option<Duration>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MemoryDecoder {
        fn with(mut self, name: &str, text: &str) -> Self {
            self.texts.insert(name.to_string(), text.to_string());
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    impl DocumentDecoder for MemoryDecoder {
        fn decode(&self, document: &DocumentRef) -> pdf::Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match document.name.as_str() {
                "panic.pdf" => panic!("decoder crashed"),
                name => self.texts.get(name).cloned().ok_or(DecodeError::NoPages),
            }
        }
    }

    struct FixedSource(Vec<&'static str>);

    impl DocumentSource for FixedSource {
        fn list(&self) -> Result<Vec<DocumentRef>, EnumerationError> {
            Ok(self.0.iter().map(|n| DocumentRef::from_path(*n)).collect())
        }
    }

    struct BrokenSource;

    impl DocumentSource for BrokenSource {
        fn list(&self) -> Result<Vec<DocumentRef>, EnumerationError> {
            Err(EnumerationError {
                path: "invoices".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }
    }

    fn docs(names: &[&str]) -> Vec<DocumentRef> {
        names.iter().map(|n| DocumentRef::from_path(*n)).collect()
    }

    const GOOD: &str = "1 USD = 0.9200 EUR\nTotal 100.00 USD";

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let decoder = MemoryDecoder::default()
            .with("a.pdf", GOOD)
            .with("no-rate.pdf", "Total 100.00 USD")
            .with("c.pdf", "1 USD = 0.8 EUR")
            .with("two-rates.pdf", "1 USD = 0.8 EUR\n1 USD = 0.9 EUR");
        let processor = BatchProcessor::new(decoder, RateExtractor::new()).with_concurrency(2);

        let names = ["a.pdf", "no-rate.pdf", "broken.pdf", "c.pdf", "two-rates.pdf"];
        let outcomes = processor.process_all(docs(&names)).await;

        let got: Vec<&str> = outcomes.iter().map(|o| o.filename()).collect();
        assert_eq!(got, names.to_vec());

        let flags: Vec<bool> = outcomes.iter().map(|o| o.is_success()).collect();
        assert_eq!(flags, vec![true, false, false, true, false]);

        assert_eq!(outcomes[1].reason(), Some("No USD/EUR rate found for this invoice"));
        assert_eq!(outcomes[2].reason(), Some("PDF has no pages"));
        assert_eq!(outcomes[4].reason(), Some("No USD/EUR rate found for this invoice"));
        assert_eq!(outcomes[0].result().unwrap().eur_to_usd.to_string(), "1.086");
        assert_eq!(outcomes[3].result().unwrap().eur_to_usd.to_string(), "1.25");
    }

    #[tokio::test]
    async fn test_order_preserved_under_concurrency() {
        let mut decoder = MemoryDecoder::default().with_delay(Duration::from_millis(10));
        let names: Vec<String> = (0..12).map(|i| format!("{:02}.pdf", i)).collect();
        for (i, name) in names.iter().enumerate() {
            let text = if i % 3 == 0 { "no rate here".to_string() } else { GOOD.to_string() };
            decoder = decoder.with(name, &text);
        }

        let processor = BatchProcessor::new(decoder, RateExtractor::new()).with_concurrency(4);
        let refs: Vec<DocumentRef> = names.iter().map(DocumentRef::from_path).collect();
        let outcomes = processor.process_all(refs).await;

        assert_eq!(outcomes.len(), 12);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.filename(), names[i]);
            assert_eq!(outcome.is_success(), i % 3 != 0);
        }
        assert_eq!(outcomes.iter().filter(|o| !o.is_success()).count(), 4);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let mut decoder = MemoryDecoder::default().with_delay(Duration::from_millis(20));
        let names: Vec<String> = (0..8).map(|i| format!("{}.pdf", i)).collect();
        for name in &names {
            decoder = decoder.with(name, GOOD);
        }

        let processor = BatchProcessor::new(decoder, RateExtractor::new()).with_concurrency(2);
        let refs: Vec<DocumentRef> = names.iter().map(DocumentRef::from_path).collect();
        let outcomes = processor.process_all(refs).await;

        assert!(outcomes.iter().all(BatchOutcome::is_success));
        assert!(processor.decoder.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_panicking_decoder_is_a_failure() {
        let decoder = MemoryDecoder::default().with("a.pdf", GOOD);
        let processor = BatchProcessor::new(decoder, RateExtractor::new());

        let outcomes = processor.process_all(docs(&["panic.pdf", "a.pdf"])).await;

        assert!(!outcomes[0].is_success());
        assert!(outcomes[0].reason().unwrap().starts_with("worker failed"));
        assert!(outcomes[1].is_success());
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let decoder = MemoryDecoder::default()
            .with("slow.pdf", GOOD)
            .with_delay(Duration::from_millis(300));
        let processor = BatchProcessor::new(decoder, RateExtractor::new())
            .with_timeout(Some(Duration::from_millis(20)));

        let outcomes = processor.process_all(docs(&["slow.pdf"])).await;

        assert_eq!(outcomes, vec![BatchOutcome::failure("slow.pdf", TIMEOUT_REASON)]);
    }

    #[tokio::test]
    async fn test_timed_out_documents_keep_their_slot() {
        let mut decoder = MemoryDecoder::default().with_delay(Duration::from_millis(200));
        let names: Vec<String> = (0..6).map(|i| format!("{}.pdf", i)).collect();
        for name in &names {
            decoder = decoder.with(name, GOOD);
        }

        let processor = BatchProcessor::new(decoder, RateExtractor::new())
            .with_concurrency(2)
            .with_timeout(Some(Duration::from_millis(20)));
        let refs: Vec<DocumentRef> = names.iter().map(DocumentRef::from_path).collect();
        let outcomes = processor.process_all(refs).await;

        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.iter().all(|o| o.reason() == Some(TIMEOUT_REASON)));
        assert!(processor.decoder.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_run_lists_then_processes() {
        let decoder = MemoryDecoder::default().with("a.pdf", GOOD);
        let processor = BatchProcessor::new(decoder, RateExtractor::new());

        let outcomes = processor.run(&FixedSource(vec!["a.pdf", "b.pdf"])).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_success());
        assert!(!outcomes[1].is_success());
    }

    #[tokio::test]
    async fn test_enumeration_failure_is_fatal() {
        let processor = BatchProcessor::new(MemoryDecoder::default(), RateExtractor::new());

        let err = processor.run(&BrokenSource).await.unwrap_err();
        assert_eq!(err.source.kind(), std::io::ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let processor = BatchProcessor::new(MemoryDecoder::default(), RateExtractor::new());
        assert!(processor.process_all(Vec::new()).await.is_empty());
    }

    #[test]
    fn test_concurrency_floor() {
        let processor =
            BatchProcessor::new(MemoryDecoder::default(), RateExtractor::new()).with_concurrency(0);
        assert_eq!(processor.concurrency(), 1);
    }
}
