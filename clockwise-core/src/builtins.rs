//! Catalog of runtime helpers callable from Clockwise code.
//!
//! The helpers themselves live in the Go runtime library that the
//! build driver merges next to the generated `package main`. This
//! table only records their names and signatures. The checker uses it
//! for arity lints and resolved typing, the generator to pick zero
//! values for conditions. Calls are always emitted by name.

use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinDescriptor {
    /// Exact Go identifier of the helper.
    pub name: &'static str,
    /// Runtime package the helper ships in (informational).
    pub logical_module: &'static str,
    pub params: &'static [Type],
    pub result: Type,
}

const S: Type = Type::String;
const I: Type = Type::Int;

macro_rules! builtin {
    ($module:literal, $name:literal, [$($param:expr),*] -> $result:expr) => {
        BuiltinDescriptor {
            name: $name,
            logical_module: $module,
            params: &[$($param),*],
            result: $result,
        }
    };
}

/// Every helper known to the core.
pub const BUILTINS: &[BuiltinDescriptor] = &[
    builtin!("cwlib", "Print", [S] -> I),
    builtin!("cwlib", "Sconcat", [S, S] -> S),
    builtin!("stringx", "Slice", [S, I, I] -> S),
    builtin!("stringx", "Trim", [S] -> S),
    builtin!("stringx", "SplitFirstTwo", [S, S] -> S),
    builtin!("baselib", "Base64Encode", [S] -> S),
    builtin!("baselib", "Base64Decode", [S] -> S),
    builtin!("hexlib", "HexEncode", [S] -> S),
    builtin!("hexlib", "HexDecode", [S] -> S),
    builtin!("mathlib", "Abs", [I] -> I),
    builtin!("mathlib", "Min", [I, I] -> I),
    builtin!("mathlib", "Max", [I, I] -> I),
    builtin!("statlib", "SumInts", [I, I] -> I),
    builtin!("statlib", "MeanInts", [I, I] -> I),
    builtin!("randlib", "RandInt", [I] -> I),
    builtin!("environs", "GetEnv", [S] -> S),
    builtin!("timelib", "NowISO", [] -> S),
    builtin!("timeparse", "ParseISO", [S] -> S),
    builtin!("uuidlib", "UUIDv4", [] -> S),
    builtin!("jsonlib", "JSONEscape", [S] -> S),
    builtin!("crc32lib", "CRC32Hex", [S] -> S),
    builtin!("hmaclib", "HMACSHA256", [S, S] -> S),
    builtin!("gziplib", "Gzip", [S] -> S),
    builtin!("gziplib", "GzipBase64", [S] -> S),
    builtin!("gziplib", "Gunzip", [S] -> S),
    builtin!("urllib", "URLEncode", [S] -> S),
    builtin!("urllib", "URLDecode", [S] -> S),
    builtin!("urlxlib", "JoinURL", [S, S] -> S),
    builtin!("pathlib", "BaseName", [S] -> S),
    builtin!("pathlib", "DirName", [S] -> S),
    builtin!("tempfilelib", "CreateTemp", [S] -> S),
    builtin!("tempfilelib", "WriteTemp", [S, S] -> S),
    builtin!("fileutil", "Remove", [S] -> I),
    builtin!("httputil", "HttpGet", [S] -> S),
    builtin!("httputil", "HttpPost", [S, S] -> S),
    builtin!("dnslib", "LookupHost", [S] -> S),
    builtin!("inilib", "ParseINI", [S, S] -> S),
    builtin!("regexlib", "RegexReplaceAll", [S, S, S] -> S),
];

/// Look up a helper by its exact name.
///
/// The search is linear over `BUILTINS` because the table is small.
pub fn find_builtin(name: &str) -> Option<&'static BuiltinDescriptor> {
    BUILTINS.iter().find(|b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_helper_takes_sequence_start_and_end() {
        let slice = find_builtin("Slice").expect("Slice is cataloged");
        assert_eq!(slice.params, &[Type::String, Type::Int, Type::Int]);
        assert_eq!(slice.result, Type::String);
    }

    #[test]
    fn lookups_are_case_sensitive() {
        assert!(find_builtin("Print").is_some());
        assert!(find_builtin("print").is_none());
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in BUILTINS.iter().enumerate() {
            assert!(
                BUILTINS[i + 1..].iter().all(|b| b.name != a.name),
                "duplicate builtin {}",
                a.name
            );
        }
    }
}
