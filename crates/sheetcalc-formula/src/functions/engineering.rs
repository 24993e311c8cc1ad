//! Engineering functions: conversions between decimal, binary, octal and hex
//!
//! Non-decimal values are at most ten digits wide. Negative numbers are
//! written as ten-digit two's complement, so the widths are 10 bits for
//! binary, 30 for octal and 40 for hex.

use super::arg;
use crate::broadcast::{lift1, lift2};
use crate::coerce::engineering::{
    nbr_conversion_format, validate_int, validate_places, validate_value, MAX_DIGITS,
};
use crate::coerce::CalcResult;
use crate::compat::CompatibilityMode;
use crate::context::EvaluationContext;
use crate::value::Value;
use sheetcalc_core::ErrorCode;

#[derive(Debug, Clone, Copy)]
struct Base {
    radix: u32,
    bits: u32,
}

const BINARY: Base = Base { radix: 2, bits: 10 };
const OCTAL: Base = Base { radix: 8, bits: 30 };
const HEX: Base = Base { radix: 16, bits: 40 };

impl Base {
    fn min(self) -> i64 {
        -(1i64 << (self.bits - 1))
    }

    fn max(self) -> i64 {
        (1i64 << (self.bits - 1)) - 1
    }

    fn digits(self, n: i64) -> String {
        match self.radix {
            2 => format!("{n:b}"),
            8 => format!("{n:o}"),
            _ => format!("{n:X}"),
        }
    }

    /// Write `n` in this base; negatives ignore `places`
    fn encode(self, n: i64, places: Option<usize>) -> CalcResult<String> {
        if n < self.min() || n > self.max() {
            return Err(ErrorCode::Num);
        }
        if n < 0 {
            return Ok(self.digits(n + (1i64 << self.bits)));
        }
        nbr_conversion_format(&self.digits(n), places)
    }

    /// Read a digit string, treating a set top bit as negative
    fn decode(self, text: &str) -> CalcResult<i64> {
        if text.is_empty() {
            return Ok(0);
        }
        if text.chars().count() > MAX_DIGITS || !text.chars().all(|c| c.is_digit(self.radix)) {
            return Err(ErrorCode::Num);
        }
        let raw = i64::from_str_radix(text, self.radix).map_err(|_| ErrorCode::Num)?;
        Ok(if raw > self.max() {
            raw - (1i64 << self.bits)
        } else {
            raw
        })
    }
}

fn decimal_input(value: &Value, mode: CompatibilityMode) -> CalcResult<i64> {
    let text = validate_value(value, mode)?;
    if text.is_empty() {
        return Ok(0);
    }
    validate_int(&Value::Text(text))
}

fn from_decimal(args: &[Value], ctx: &EvaluationContext, to: Base) -> Value {
    lift2(arg(args, 0), arg(args, 1), |value, places| {
        let n = decimal_input(value, ctx.mode())?;
        let places = validate_places(Some(places))?;
        Ok(Value::Text(to.encode(n, places)?))
    })
}

fn to_decimal(args: &[Value], ctx: &EvaluationContext, from: Base) -> Value {
    lift1(arg(args, 0), |value| {
        let text = validate_value(value, ctx.mode())?;
        Ok(Value::Number(from.decode(&text)? as f64))
    })
}

fn convert(args: &[Value], ctx: &EvaluationContext, from: Base, to: Base) -> Value {
    lift2(arg(args, 0), arg(args, 1), |value, places| {
        let text = validate_value(value, ctx.mode())?;
        let n = from.decode(&text)?;
        let places = validate_places(Some(places))?;
        Ok(Value::Text(to.encode(n, places)?))
    })
}

/// DEC2BIN(number, [places])
pub fn fn_dec2bin(args: &[Value], ctx: &EvaluationContext) -> Value {
    from_decimal(args, ctx, BINARY)
}

pub fn fn_dec2oct(args: &[Value], ctx: &EvaluationContext) -> Value {
    from_decimal(args, ctx, OCTAL)
}

pub fn fn_dec2hex(args: &[Value], ctx: &EvaluationContext) -> Value {
    from_decimal(args, ctx, HEX)
}

/// BIN2DEC(number)
pub fn fn_bin2dec(args: &[Value], ctx: &EvaluationContext) -> Value {
    to_decimal(args, ctx, BINARY)
}

pub fn fn_oct2dec(args: &[Value], ctx: &EvaluationContext) -> Value {
    to_decimal(args, ctx, OCTAL)
}

pub fn fn_hex2dec(args: &[Value], ctx: &EvaluationContext) -> Value {
    to_decimal(args, ctx, HEX)
}

pub fn fn_bin2oct(args: &[Value], ctx: &EvaluationContext) -> Value {
    convert(args, ctx, BINARY, OCTAL)
}

pub fn fn_bin2hex(args: &[Value], ctx: &EvaluationContext) -> Value {
    convert(args, ctx, BINARY, HEX)
}

pub fn fn_oct2bin(args: &[Value], ctx: &EvaluationContext) -> Value {
    convert(args, ctx, OCTAL, BINARY)
}

pub fn fn_oct2hex(args: &[Value], ctx: &EvaluationContext) -> Value {
    convert(args, ctx, OCTAL, HEX)
}

pub fn fn_hex2bin(args: &[Value], ctx: &EvaluationContext) -> Value {
    convert(args, ctx, HEX, BINARY)
}

pub fn fn_hex2oct(args: &[Value], ctx: &EvaluationContext) -> Value {
    convert(args, ctx, HEX, OCTAL)
}
