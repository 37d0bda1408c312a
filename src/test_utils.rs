use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{de::{Error, MapAccess, Visitor}, Deserialize, Deserializer};

/// What a single top-level statement of a fixture program should do.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedResult {
    /// Succeeds, printing exactly these lines
    Output(Vec<String>),
    SyntaxError,
    RuntimeError,
    ReturnOutsideFunction,
}

struct ExpectedResultVisitor {}

impl<'de> Deserialize<'de> for ExpectedResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de> {

        deserializer.deserialize_map(ExpectedResultVisitor {})
    }
}

impl<'de> Visitor<'de> for ExpectedResultVisitor {
    type Value = ExpectedResult;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "A structure containing the boolean key 'ok'. If it's okay, contains the key 'output', otherwise the key 'type'")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>, {

        if map.next_key::<String>()? != Some("ok".to_owned()) {
            return Err(A::Error::custom("First key should be 'ok'"))
        }

        let ok: bool = map.next_value()?;
        let second_key = map.next_key::<String>()?
            .ok_or(A::Error::custom("Must have two keys"))?;

        let result = if ok {
            if second_key != "output" {
                return Err(A::Error::custom("Second key of a success should be 'output'"))
            }
            ExpectedResult::Output(map.next_value()?)
        } else {
            if second_key != "type" {
                return Err(A::Error::custom("Second key of a failure should be 'type'"))
            }
            match map.next_value::<String>()?.as_ref() {
                "SyntaxError" => ExpectedResult::SyntaxError,
                "RuntimeError" => ExpectedResult::RuntimeError,
                "ReturnOutsideFunction" => ExpectedResult::ReturnOutsideFunction,
                other => return Err(A::Error::custom(format!("Unrecognized error type: {}", other)))
            }
        };

        if map.next_key::<String>()?.is_some() {
            return Err(A::Error::custom("Only two keys should be present"));
        }

        Ok(result)
    }
}

fn load_output_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ExpectedResult>> {
    let source = std::fs::read(path)?;
    Ok(serde_json::from_slice(&source)?)
}

/// Loads the program and per-statement expectations of one fixture.
pub fn load_test_pair(testcase: usize) -> anyhow::Result<(String, Vec<ExpectedResult>)> {
    if !all_testcases().any(|known| known == testcase) { bail!("Testcase out of bounds"); }

    let base_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let input = std::fs::read_to_string(base_path.join("test_inputs").join(format!("{}.silly", testcase)))?;
    let output = load_output_file(base_path.join("test_outputs").join(format!("{}.json", testcase)))?;

    if output.is_empty() { bail!("Testcase {} has no expectations", testcase); }
    Ok((input, output))
}

pub fn all_testcases() -> impl Iterator<Item = usize> {
    1..=10
}
