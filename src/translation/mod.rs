/*!
 * Translation of prepared documents through a remote language model.
 *
 * - `core`: the caching, retrying `TranslationClient`
 * - `batch`: the bounded-concurrency `Orchestrator`
 * - `cache`: process-lifetime translation cache
 * - `retry`: retry policy with exponential backoff
 * - `prompts`: prompt texts and the word-by-word schema
 */

pub use self::batch::{BatchSummary, CancellationToken, Orchestrator, OrchestratorOptions, PhoneticSource};
pub use self::cache::{CacheStats, TranslationCache};
pub use self::core::{ClientConfig, TranslationClient};
pub use self::retry::RetryPolicy;

pub mod batch;
pub mod cache;
pub mod core;
pub mod prompts;
pub mod retry;
