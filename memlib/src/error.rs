use thiserror::Error;

/// Rejections raised while building a simulation from its configuration.
///
/// All of these surface before any simulator state is constructed; once a
/// store has been built, its operations are total.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cache size {0} must be a positive multiple of 4")]
    BadCacheSize(u32),

    #[error("block size {0} must be at least 4 and a multiple of 4")]
    BadBlockSize(u32),

    #[error("block size {0} is not a power of two")]
    BlockNotPowerOfTwo(u32),

    #[error("block size {block} exceeds cache size {size}")]
    BlockLargerThanCache { block: u32, size: u32 },

    #[error("a store of {capacity} slots cannot be split into {ways}-way sets")]
    CapacityNotWayDivisible { capacity: u32, ways: u32 },

    #[error("{0} sets is not a power of two")]
    SetsNotPowerOfTwo(u32),

    #[error("a store cannot hold zero slots")]
    ZeroCapacity,

    #[error("TLB entry count {0} must be at least 2 and a power of two")]
    BadTlbEntries(u32),

    #[error("a configuration needs one or two cache levels, got {0}")]
    BadLevelCount(usize),

    #[error("L{level} ({size} bytes) is smaller than L{prev_level} ({prev_size} bytes)")]
    ShrinkingLevelSize {
        level: usize,
        size: u32,
        prev_level: usize,
        prev_size: u32,
    },

    #[error("L{level} block size {block} is smaller than L{prev_level} block size {prev_block}")]
    ShrinkingBlockSize {
        level: usize,
        block: u32,
        prev_level: usize,
        prev_block: u32,
    },

    #[error("couldn't parse the configuration: {0}")]
    Parse(String),
}

/// Failures while consuming the trace stream. A malformed line is terminal:
/// processing stops there and the statistics gathered so far stand.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("malformed trace line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("couldn't read the trace: {0}")]
    Io(#[from] std::io::Error),
}
