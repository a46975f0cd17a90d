//! Portal query model and the canned scenario payloads
//!
//! A [`Query`] is an immutable template: the streamer only ever overrides its
//! `fromBlock`/`toBlock` fields (via [`Query::with_range`]); everything else
//! is serialized to the portal exactly as built here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field selection: category name to per-field inclusion flags.
pub type FieldSelection = BTreeMap<String, BTreeMap<String, bool>>;

/// A portal streaming query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
    /// Dataset kind, e.g. `"solana"`.
    #[serde(rename = "type")]
    pub dataset_kind: String,
    /// Which fields of each data category to include in the response.
    pub fields: FieldSelection,
    /// Instruction filters; an empty object matches every instruction.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<InstructionFilter>,
    /// Transaction filters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<serde_json::Value>,
    /// Log filters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<serde_json::Value>,
    /// Balance filters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub balances: Vec<serde_json::Value>,
    /// Token balance filters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub token_balances: Vec<serde_json::Value>,
    /// Reward filters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rewards: Vec<serde_json::Value>,
    /// Start of the requested block range, inclusive. Set per request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<u64>,
    /// End of the requested block range, inclusive. Set per request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<u64>,
}

impl Query {
    /// A query against the Solana dataset with the given field selection.
    pub fn solana(fields: FieldSelection) -> Self {
        Self {
            dataset_kind: "solana".to_string(),
            fields,
            ..Self::default()
        }
    }

    /// Clone this template with the block range overridden.
    /// Non-range fields are never touched.
    pub fn with_range(&self, from_block: u64, to_block: u64) -> Self {
        debug_assert!(to_block >= from_block);
        let mut query = self.clone();
        query.from_block = Some(from_block);
        query.to_block = Some(to_block);
        query
    }
}

/// One instruction filter. Absent fields are omitted from the payload, so an
/// all-default filter serializes as `{}` and matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InstructionFilter {
    /// Program addresses (base58) to match.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub program_id: Vec<String>,
    /// One-byte instruction discriminator prefixes (hex).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub d1: Vec<String>,
    /// Eight-byte instruction discriminator prefixes (hex).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub d8: Vec<String>,
    /// Include inner instructions of matched instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_instructions: Option<bool>,
    /// Match only committed instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_committed: Option<bool>,
    /// Include the enclosing transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<bool>,
    /// Include the transaction's token balances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_token_balances: Option<bool>,
    /// Include logs of matched instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<bool>,
}

fn category(entries: &[&str]) -> BTreeMap<String, bool> {
    entries.iter().map(|name| (name.to_string(), true)).collect()
}

fn match_all() -> Vec<serde_json::Value> {
    vec![serde_json::Value::Object(serde_json::Map::new())]
}

/// The full field selection used by every canned scenario.
pub fn all_fields() -> FieldSelection {
    let mut fields = FieldSelection::new();
    fields.insert("balance".to_string(), category(&["pre", "post"]));
    fields.insert(
        "log".to_string(),
        category(&["programId", "instructionAddress", "kind", "message"]),
    );
    fields.insert(
        "tokenBalance".to_string(),
        category(&[
            "preDecimals",
            "postDecimals",
            "postMint",
            "postAmount",
            "preAmount",
            "preOwner",
            "preMint",
            "postOwner",
        ]),
    );
    fields.insert(
        "instruction".to_string(),
        category(&["accounts", "isCommitted", "programId", "data"]),
    );
    fields.insert(
        "reward".to_string(),
        category(&["lamports", "rewardType", "postBalance", "commission"]),
    );
    fields.insert(
        "transaction".to_string(),
        category(&[
            "signatures",
            "err",
            "version",
            "accountKeys",
            "addressTableLookups",
            "loadedAddresses",
            "feePayer",
        ]),
    );
    fields.insert(
        "block".to_string(),
        category(&["parentHash", "parentNumber", "number", "height", "timestamp"]),
    );
    fields
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Everything the dataset has: all categories with match-all filters.
pub fn fetch_all() -> Query {
    let mut query = Query::solana(all_fields());
    query.instructions = vec![InstructionFilter::default()];
    query.transactions = match_all();
    query.logs = match_all();
    query.balances = match_all();
    query.token_balances = match_all();
    query.rewards = match_all();
    query
}

/// Instruction filters over eight heavily-traded programs (DEXes, AMMs and
/// launchpads); the mixed d1/d8 discriminators select swap-shaped calls.
pub fn multiple_instructions() -> Query {
    let mut query = Query::solana(all_fields());
    query.instructions = vec![
        InstructionFilter {
            d8: strings(&[
                "0x66063d1201daebea",
                "0x33e685a4017f83ad",
                "0x181ec828051c0777",
                "0xb712469c946da122",
            ]),
            program_id: strings(&["6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P"]),
            inner_instructions: Some(true),
            is_committed: Some(true),
            transaction_token_balances: Some(true),
            transaction: Some(true),
            ..InstructionFilter::default()
        },
        InstructionFilter {
            program_id: strings(&["MoonCVVNZFSYkqNXP6bxHLPL6QQJiMagDL3qcqUQTrG"]),
            transaction: Some(true),
            transaction_token_balances: Some(true),
            logs: Some(true),
            d8: strings(&[
                "0x032ca4b87b0df5b3",
                "0x2ae50ae7bd3ec1ae",
                "0x66063d1201daebea",
                "0x33e685a4017f83ad",
            ]),
            inner_instructions: Some(true),
            is_committed: Some(true),
            ..InstructionFilter::default()
        },
        InstructionFilter {
            inner_instructions: Some(true),
            is_committed: Some(true),
            d8: strings(&[
                "0xf8c69e91e17587c8",
                "0x2e9cf3760dcdfbb2",
                "0xa026d06f685b2c01",
                "0x5fb40aac54aee828",
                "0xcf2d57f21b3fcc43",
            ]),
            transaction_token_balances: Some(true),
            program_id: strings(&["whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc"]),
            transaction: Some(true),
            ..InstructionFilter::default()
        },
        InstructionFilter {
            transaction_token_balances: Some(true),
            program_id: strings(&["FLUXubRmkEi2q6K3Y9kBPg9248ggaZVsoSFhtJHSrm1X"]),
            inner_instructions: Some(true),
            is_committed: Some(true),
            d1: strings(&["0x01", "0x02", "0x03", "0x00"]),
            transaction: Some(true),
            ..InstructionFilter::default()
        },
        InstructionFilter {
            d1: strings(&["0x09", "0x0b", "0x03", "0x01", "0x04"]),
            is_committed: Some(true),
            transaction_token_balances: Some(true),
            inner_instructions: Some(true),
            program_id: strings(&["675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8"]),
            transaction: Some(true),
            ..InstructionFilter::default()
        },
        InstructionFilter {
            program_id: strings(&["LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo"]),
            transaction_token_balances: Some(true),
            is_committed: Some(true),
            transaction: Some(true),
            inner_instructions: Some(true),
            d8: strings(&[
                "0xf8c69e91e17587c8",
                "0xb59d59438fb63448",
                "0x1c8cee63e7a21595",
                "0x0703967f94283dc8",
                "0x2905eeaf64e106cd",
                "0x5e9b6797465fdca5",
                "0xa1c26754ab47fa9a",
                "0x5055d14818ceb16c",
                "0x0a333d2370691855",
                "0x1a526698f04a691a",
                "0x2d9aedd2dd0fa65c",
            ]),
            ..InstructionFilter::default()
        },
        InstructionFilter {
            transaction: Some(true),
            program_id: strings(&["Eo7WjKq67rjJQSZxS6z3YkapzY3eMj6Xy8X5EQVn5UaB"]),
            d8: strings(&[
                "0xf8c69e91e17587c8",
                "0x5454b142feb90afb",
                "0x4f237a54ad0f5dbf",
                "0x04e4d747e1fd77ce",
                "0x76ad299dad486167",
                "0x06874493e552a971",
                "0x856d2cb338ee7221",
                "0xa8e3323ebdab54b0",
                "0x07a68aabceabecf4",
            ]),
            transaction_token_balances: Some(true),
            is_committed: Some(true),
            inner_instructions: Some(true),
            ..InstructionFilter::default()
        },
        InstructionFilter {
            transaction_token_balances: Some(true),
            d1: strings(&["0x01", "0x02", "0x04", "0x03", "0x05"]),
            transaction: Some(true),
            inner_instructions: Some(true),
            is_committed: Some(true),
            program_id: strings(&["9W959DqEETiGZocYWCQPaJ6sBmUzgfxXfqGeTEdp3aQP"]),
            ..InstructionFilter::default()
        },
    ];
    query
}

/// One busy program with the full discriminator list; the medium-selectivity
/// scenario.
pub fn single_instruction() -> Query {
    let mut query = Query::solana(all_fields());
    query.instructions = vec![InstructionFilter {
        d8: strings(&[
            "0xf8c69e91e17587c8",
            "0xb59d59438fb63448",
            "0x1c8cee63e7a21595",
            "0x0703967f94283dc8",
            "0x2905eeaf64e106cd",
            "0x5e9b6797465fdca5",
            "0xa1c26754ab47fa9a",
            "0x5055d14818ceb16c",
            "0x0a333d2370691855",
            "0x1a526698f04a691a",
            "0x2d9aedd2dd0fa65c",
        ]),
        transaction: Some(true),
        transaction_token_balances: Some(true),
        inner_instructions: Some(true),
        is_committed: Some(true),
        program_id: strings(&["LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo"]),
        ..InstructionFilter::default()
    }];
    query
}

/// A filter that matches nothing (the program id is deliberately off by one
/// character), exercising the server's empty-response path.
pub fn empty() -> Query {
    let mut query = Query::solana(all_fields());
    query.instructions = vec![InstructionFilter {
        d8: strings(&[
            "0xf8c69e91e17587c8",
            "0xb59d59438fb63448",
            "0x1c8cee63e7a21595",
            "0x0703967f94283dc8",
            "0x2905eeaf64e106cd",
            "0x5e9b6797465fdca5",
            "0xa1c26754ab47fa9a",
            "0x5055d14818ceb16c",
            "0x0a333d2370691855",
            "0x1a526698f04a691a",
            "0x2d9aedd2dd0fa65c",
        ]),
        is_committed: Some(true),
        program_id: strings(&["LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwx1"]),
        ..InstructionFilter::default()
    }];
    query
}
