//! JSON Export
//!
//! Writes a contract's ABI summary to a JSON file.

use crate::session::render::ContractView;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct ExportableContract<'a> {
    address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compiler: Option<&'a str>,
    verified: bool,
    functions: &'a [String],
    events: &'a [String],
}

/// Write the contract summary. Returns the number of ABI items written.
pub fn write_contract(
    path: &Path,
    address: &str,
    contract: &ContractView,
) -> Result<usize, Box<dyn std::error::Error>> {
    let export = ExportableContract {
        address,
        name: contract.name.as_deref(),
        compiler: contract.compiler.as_deref(),
        verified: contract.verified,
        functions: &contract.functions,
        events: &contract.events,
    };

    let json = serde_json::to_string_pretty(&export)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(contract.functions.len() + contract.events.len())
}
