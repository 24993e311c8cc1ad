//! Argument coercion and validation
//!
//! Validators turn a loosely typed [`Value`](crate::Value) into the strict
//! type a function needs, honoring the compatibility mode. They fail with the
//! [`ErrorCode`] the calling function should return, so function bodies can
//! chain them with `?` and convert the failure into a value at the end.
//!
//! The rules differ per function family, hence one submodule per domain.

pub mod engineering;
pub mod financial;
pub mod lookup;
pub mod numeric;
pub mod statistical;
pub mod text;

use sheetcalc_core::ErrorCode;

/// Result of a validator: the coerced value or the error the cell shows
pub type CalcResult<T> = Result<T, ErrorCode>;
