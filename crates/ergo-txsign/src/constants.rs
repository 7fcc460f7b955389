// Cost of setting up the script interpreter for one transaction.
pub const INTERPRETER_INIT_COST: u64 = 10_000;

// Launch values of the adjustable block parameters.
pub const DEFAULT_MAX_BLOCK_COST: u64 = 1_000_000;
pub const DEFAULT_INPUT_COST: u64 = 2_000;
pub const DEFAULT_DATA_INPUT_COST: u64 = 100;
pub const DEFAULT_OUTPUT_COST: u64 = 100;
pub const DEFAULT_TOKEN_ACCESS_COST: u64 = 100;
pub const DEFAULT_BLOCK_VERSION: u8 = 3;

pub const MIN_BLOCK_VERSION: u8 = 1;
pub const MAX_BLOCK_VERSION: u8 = 4;

pub const BOX_ID_BYTES: usize = 32;
pub const TOKEN_ID_BYTES: usize = 32;
pub const TX_ID_BYTES: usize = 32;
pub const GROUP_ELEMENT_BYTES: usize = 33;
pub const STATE_DIGEST_BYTES: usize = 33;

pub const MAX_TOKENS_PER_BOX: usize = 255;
pub const MAX_REGISTERS: usize = 6;
pub const MAX_EXTENSION_ENTRIES: usize = 255;
pub const MAX_HEADERS_IN_CONTEXT: usize = 10;

pub const ERGO_TREE_VERSION_MASK: u8 = 0x07;
pub const ERGO_TREE_SIZE_FLAG: u8 = 0x08;

// SigmaBoolean wire opcodes.
pub const SIGMA_OP_FALSE: u8 = 0xd2;
pub const SIGMA_OP_TRUE: u8 = 0xd3;
pub const SIGMA_OP_PROVE_DLOG: u8 = 0xcd;
pub const SIGMA_OP_PROVE_DH_TUPLE: u8 = 0xce;
pub const SIGMA_OP_AND: u8 = 0x96;
pub const SIGMA_OP_OR: u8 = 0x97;
pub const SIGMA_OP_THRESHOLD: u8 = 0x98;

pub const MAX_SIGMA_DEPTH: usize = 64;

// Verification cost estimate, in block cost units.
pub const PROVE_DLOG_VERIFY_COST: u64 = 184;
pub const PROVE_DH_TUPLE_VERIFY_COST: u64 = 368;
pub const SIGMA_NODE_VERIFY_COST: u64 = 10;
pub const SIGMA_CHILD_VERIFY_COST: u64 = 2;
