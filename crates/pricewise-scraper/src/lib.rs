pub mod aggregator;
pub mod cache;
pub mod compare;
pub mod demo;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod urls;

pub use aggregator::{AggregatorSearch, CustomSearchClient, ShoppingSearch};
pub use cache::{Clock, FileStore, KvStore, MemoryStore, ResultCache, StoreError, SystemClock};
pub use compare::{Comparison, ComparisonSource, PriceComparer};
pub use demo::{demo_comparison, mock_results, DEMO_PRODUCT_NAME};
pub use error::{CompareError, ScraperError};
pub use fetch::{PageFetcher, RelayFetcher};
pub use normalize::{normalize_price, similarity};
pub use urls::{clean_title, detect_retailer, extract_name_from_url, normalize_url};
