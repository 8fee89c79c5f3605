//! Boundary Entry Point
//!
//! The externally callable parse operation. Decodes the raw input buffers,
//! assembles parser options for this call, runs the grammar, flattens
//! whatever tree came back (even alongside an error, for partial-tree
//! recovery), classifies the failure, and hands the serialized envelope
//! back as an owned null-terminated buffer. The buffer is registered in
//! the block registry; the caller owns it and must `release` its address.

use crate::error::Error;
use crate::flatten::{classify_error, map_file, ParseResult};
use crate::syntax::{self, ast, LangVariant, ParserOptions};

use super::memory;

/// Run one parse over raw input bytes and build the serialized result
/// envelope, terminating zero byte included. Every input produces some
/// non-empty buffer; a serialization failure degrades to the failure's own
/// message rather than a crash.
pub fn run_parse(
    filepath: &[u8],
    text: &[u8],
    keep_comments: bool,
    variant: i32,
    stop_at: &[u8],
    recover_errors: i32,
) -> Vec<u8> {
    let filepath = String::from_utf8_lossy(filepath).into_owned();
    let text = String::from_utf8_lossy(text).into_owned();
    let stop_at = String::from_utf8_lossy(stop_at).into_owned();

    let (file, error) = match LangVariant::try_from(variant) {
        Ok(variant) => {
            let options = ParserOptions {
                keep_comments,
                variant,
                stop_at: if stop_at.is_empty() { None } else { Some(stop_at) },
                recover_errors: recover_errors.max(0) as u32,
            };
            let (file, error) = syntax::parse(&text, &filepath, &options);
            (file, error.map(Error::from))
        }
        // Unreadable configuration: skip the grammar, answer with the
        // zero-value empty file and an opaque error.
        Err(bad) => {
            let file = ast::File {
                name: filepath.clone(),
                ..Default::default()
            };
            (file, Some(Error::UnknownVariant(bad)))
        }
    };

    let (parse_error, message) = classify_error(error.as_ref());
    let result = ParseResult {
        file: map_file(&file),
        text,
        parse_error,
        message,
    };

    let mut bytes = match serde_json::to_vec(&result) {
        Ok(bytes) => bytes,
        Err(error) => {
            eprintln!("{}", error);
            error.to_string().into_bytes()
        }
    };
    bytes.push(0);
    bytes
}

/// `run_parse`, with the buffer parked in the block registry. Ownership of
/// the returned address transfers to the caller, who pairs it with one
/// eventual `release`.
pub fn parse_call(
    filepath: &[u8],
    text: &[u8],
    keep_comments: bool,
    variant: i32,
    stop_at: &[u8],
    recover_errors: i32,
) -> *const u8 {
    memory::adopt(run_parse(
        filepath,
        text,
        keep_comments,
        variant,
        stop_at,
        recover_errors,
    ))
}

unsafe fn bytes_from<'a>(ptr: *const u8, len: usize) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len)
    }
}

/// Host-facing allocation: a scratch block the host writes input into.
#[no_mangle]
pub extern "C" fn allocate(size: usize) -> *mut u8 {
    memory::request(size)
}

/// Host-facing release of any block previously handed out, input scratch
/// and result buffers alike.
#[no_mangle]
pub extern "C" fn release(ptr: *mut u8) {
    memory::release(ptr)
}

/// Host-facing parse. The caller finds the end of the result by scanning
/// for the terminating zero byte; no explicit length is returned.
#[no_mangle]
pub unsafe extern "C" fn parse(
    filepath_ptr: *const u8,
    filepath_len: usize,
    text_ptr: *const u8,
    text_len: usize,
    keep_comments: i32,
    variant: i32,
    stop_at_ptr: *const u8,
    stop_at_len: usize,
    recover_errors: i32,
) -> *const u8 {
    let filepath = bytes_from(filepath_ptr, filepath_len);
    let text = bytes_from(text_ptr, text_len);
    let stop_at = bytes_from(stop_at_ptr, stop_at_len);
    parse_call(
        filepath,
        text,
        keep_comments != 0,
        variant,
        stop_at,
        recover_errors,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn decode(bytes: &[u8]) -> Value {
        assert!(!bytes.is_empty());
        assert_eq!(*bytes.last().unwrap(), 0, "missing terminating zero byte");
        serde_json::from_slice(&bytes[..bytes.len() - 1]).expect("result is not valid JSON")
    }

    fn call(text: &str, variant: i32, recover_errors: i32) -> Value {
        decode(&run_parse(
            b"test.sh",
            text.as_bytes(),
            true,
            variant,
            b"",
            recover_errors,
        ))
    }

    #[test]
    fn test_every_call_returns_terminated_buffer() {
        let texts: &[&[u8]] = &[
            b"",
            b"echo hi",
            b"if broken",
            b"\xff\xfe garbage \xff",
            b"a | b && c",
        ];
        for text in texts {
            for variant in [0, 1, 2, 3, 99] {
                for recover in [0, 2] {
                    let bytes = run_parse(b"f.sh", text, true, variant, b"", recover);
                    assert!(bytes.len() > 1);
                    assert_eq!(*bytes.last().unwrap(), 0);
                }
            }
        }
    }

    #[test]
    fn test_successful_parse_envelope() {
        let value = call("echo hello", 0, 0);
        assert_eq!(value["file"]["type"], "File");
        assert_eq!(value["text"], "echo hello");
        assert!(value["parseError"].is_null());
        assert_eq!(value["message"], "");
        assert_eq!(value["file"]["stmts"][0]["cmd"]["type"], "CallExpr");
    }

    #[test]
    fn test_else_distinct_from_absent() {
        let without = call("if a; then b; fi", 0, 0);
        assert!(without["file"]["stmts"][0]["cmd"]["else"].is_null());

        let with = call("if a; then b; else c; fi", 0, 0);
        let els = &with["file"]["stmts"][0]["cmd"]["else"];
        assert_eq!(els["type"], "IfClause");
        let then = els["then"].as_array().unwrap();
        assert_eq!(then.len(), 1);
        assert_eq!(then[0]["cmd"]["args"][0]["parts"][0]["value"], "c");
    }

    #[test]
    fn test_statement_order_round_trip() {
        let value = call("a; b; c", 0, 0);
        let stmts = value["file"]["stmts"].as_array().unwrap();
        assert_eq!(stmts.len(), 3);
        let offsets: Vec<u64> = stmts
            .iter()
            .map(|s| s["pos"]["offset"].as_u64().unwrap())
            .collect();
        assert!(offsets[0] < offsets[1] && offsets[1] < offsets[2]);
    }

    #[test]
    fn test_error_envelope_on_malformed_input() {
        let value = call("if a; then", 0, 0);
        let parse_error = &value["parseError"];
        assert!(!parse_error.is_null());
        assert!(!parse_error["message"].as_str().unwrap().is_empty());
        assert!(parse_error["pos"]["offset"].as_u64().unwrap() >= 10);
        assert_eq!(value["message"], parse_error["message"]);
        // Best-effort tree still present.
        assert_eq!(value["file"]["type"], "File");
    }

    #[test]
    fn test_partial_tree_alongside_error() {
        let value = call("echo ok\nif broken; then", 0, 0);
        assert!(!value["parseError"].is_null());
        assert_eq!(value["file"]["stmts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_recovery_suppresses_error() {
        let value = call("cmd <\necho ok\n", 0, 1);
        assert!(value["parseError"].is_null());
        assert_eq!(value["file"]["stmts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_variant_is_opaque_error() {
        let value = call("echo hi", 42, 0);
        assert!(value["parseError"].is_null());
        assert_eq!(value["message"], "unknown language variant 42");
        // The parser never ran: zero-value empty file.
        assert_eq!(value["file"]["type"], "File");
        assert!(value["file"]["stmts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_negative_recover_errors_means_none() {
        let value = call("if a; then", 0, -5);
        assert!(!value["parseError"].is_null());
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let value = decode(&run_parse(b"f.sh", b"echo \xff", true, 0, b"", 0));
        assert!(value["parseError"].is_null());
        assert!(value["text"].as_str().unwrap().contains('\u{FFFD}'));
    }

    #[test]
    fn test_stop_at_flag_reaches_parser() {
        let value = decode(&run_parse(
            b"f.sh",
            b"echo before\n$$ echo after\n",
            true,
            0,
            b"$$",
            0,
        ));
        assert_eq!(value["file"]["stmts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_call_registers_result_buffer() {
        let addr = parse_call(b"f.sh", b"echo hi", true, 0, b"", 0);
        assert!(!addr.is_null());
        assert!(memory::is_registered(addr));

        let mut bytes = Vec::new();
        unsafe {
            let mut i = 0;
            loop {
                let b = *addr.add(i);
                bytes.push(b);
                if b == 0 {
                    break;
                }
                i += 1;
            }
        }
        let value = decode(&bytes);
        assert_eq!(value["file"]["type"], "File");

        memory::release(addr as *mut u8);
        assert!(!memory::is_registered(addr));
    }

    #[test]
    fn test_exported_parse_tolerates_null_inputs() {
        let addr = unsafe {
            parse(
                std::ptr::null(),
                0,
                std::ptr::null(),
                0,
                1,
                0,
                std::ptr::null(),
                0,
                0,
            )
        };
        assert!(!addr.is_null());
        unsafe {
            // Empty input still produces a JSON envelope, not an empty buffer.
            assert_eq!(*addr, b'{');
        }
        memory::release(addr as *mut u8);
    }

    #[test]
    fn test_allocate_release_round_trip() {
        let addr = allocate(64);
        assert!(!addr.is_null());
        unsafe {
            addr.write_bytes(b'x', 64);
        }
        release(addr);
        release(addr);
    }
}
