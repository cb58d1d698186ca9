//! Pipeline ingest stages: transcript cleaning, LLM opinion extraction, and
//! chunked price-history download planning.

pub mod downloader;
pub mod extractor;
pub mod transcript;

pub use downloader::{chunk_tickers, reverse_lookup, PriceDownloader, ReverseLut};
pub use extractor::{
    apply_ticker_map, merge_extracted, strip_code_fences, ticker_map, ExtractorConfig,
    OpinionExtractor, TickerMapping,
};
pub use transcript::{clean_vtt_text, clean_vtt_to_script};
