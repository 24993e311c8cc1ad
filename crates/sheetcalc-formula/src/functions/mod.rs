//! Built-in spreadsheet functions

pub mod engineering;
pub mod financial;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod statistical;
pub mod subtotal;
pub mod text;
pub mod trig;

use crate::ast::Expr;
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::value::Value;
use ahash::AHashMap;
use std::sync::OnceLock;

/// Implementation over evaluated arguments
///
/// Eager functions are total: a bad argument becomes an error value.
pub type EagerFn = fn(&[Value], &EvaluationContext) -> Value;

/// Implementation over unevaluated arguments
///
/// Used where a function must skip evaluating some arguments (IF) or needs
/// the cell coordinates behind a reference (SUBTOTAL, ROWS).
pub type LazyFn = fn(&[Expr], &EvaluationContext) -> FormulaResult<Value>;

#[derive(Clone, Copy)]
pub enum FunctionKind {
    Eager(EagerFn),
    Lazy(LazyFn),
}

/// Function definition
#[derive(Clone, Copy)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    pub kind: FunctionKind,
    /// Result changes on every evaluation
    pub volatile: bool,
}

impl FunctionDef {
    pub const fn eager(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: EagerFn,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args,
            kind: FunctionKind::Eager(implementation),
            volatile: false,
        }
    }

    pub const fn lazy(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: LazyFn,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args,
            kind: FunctionKind::Lazy(implementation),
            volatile: false,
        }
    }

    pub const fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    /// Human-readable arity, e.g. "1", "1 to 3", "at least 1"
    pub fn arity(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{} to {}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }
}

/// Function registry, keyed by upper-case name
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a registry holding every built-in function
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_logical_functions();
        registry.register_info_functions();
        registry.register_math_functions();
        registry.register_trig_functions();
        registry.register_statistical_functions();
        registry.register_lookup_functions();
        registry.register_text_functions();
        registry.register_engineering_functions();
        registry.register_financial_functions();

        tracing::debug!("registered {} built-in functions", registry.len());
        registry
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function, replacing any previous definition
    pub fn register(&mut self, def: FunctionDef) {
        let key = def.name.to_uppercase();
        if self.functions.insert(key, def).is_some() {
            tracing::warn!("function {} registered twice; keeping the last", def.name);
        }
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// All definitions sorted by name
    pub fn definitions(&self) -> Vec<&FunctionDef> {
        let mut defs: Vec<&FunctionDef> = self.functions.values().collect();
        defs.sort_by_key(|def| def.name);
        defs
    }

    fn register_all(&mut self, defs: impl IntoIterator<Item = FunctionDef>) {
        for def in defs {
            self.register(def);
        }
    }

    fn register_logical_functions(&mut self) {
        self.register_all([
            FunctionDef::eager("AND", 1, None, logical::fn_and),
            FunctionDef::eager("OR", 1, None, logical::fn_or),
            FunctionDef::eager("XOR", 1, None, logical::fn_xor),
            FunctionDef::eager("NOT", 1, Some(1), logical::fn_not),
            FunctionDef::eager("TRUE", 0, Some(0), logical::fn_true),
            FunctionDef::eager("FALSE", 0, Some(0), logical::fn_false),
            FunctionDef::lazy("IF", 2, Some(3), logical::fn_if),
            FunctionDef::lazy("IFERROR", 2, Some(2), logical::fn_iferror),
            FunctionDef::lazy("IFNA", 2, Some(2), logical::fn_ifna),
        ]);
    }

    fn register_info_functions(&mut self) {
        self.register_all([
            FunctionDef::eager("ISERROR", 1, Some(1), info::fn_iserror),
            FunctionDef::eager("ISERR", 1, Some(1), info::fn_iserr),
            FunctionDef::eager("ISNA", 1, Some(1), info::fn_isna),
            FunctionDef::eager("ISNUMBER", 1, Some(1), info::fn_isnumber),
            FunctionDef::eager("ISTEXT", 1, Some(1), info::fn_istext),
            FunctionDef::eager("ISLOGICAL", 1, Some(1), info::fn_islogical),
            FunctionDef::eager("ISBLANK", 1, Some(1), info::fn_isblank),
            FunctionDef::eager("NA", 0, Some(0), info::fn_na),
            FunctionDef::eager("ERROR.TYPE", 1, Some(1), info::fn_error_type),
        ]);
    }

    fn register_math_functions(&mut self) {
        self.register_all([
            FunctionDef::eager("ABS", 1, Some(1), math::fn_abs),
            FunctionDef::eager("EXP", 1, Some(1), math::fn_exp),
            FunctionDef::eager("LN", 1, Some(1), math::fn_ln),
            FunctionDef::eager("SQRT", 1, Some(1), math::fn_sqrt),
            FunctionDef::eager("INT", 1, Some(1), math::fn_int),
            FunctionDef::eager("SIGN", 1, Some(1), math::fn_sign),
            FunctionDef::eager("MOD", 2, Some(2), math::fn_mod),
            FunctionDef::eager("POWER", 2, Some(2), math::fn_power),
            FunctionDef::eager("ROUND", 2, Some(2), math::fn_round),
            FunctionDef::eager("PI", 0, Some(0), math::fn_pi),
            FunctionDef::eager("SUM", 1, None, math::fn_sum),
            FunctionDef::eager("PRODUCT", 1, None, math::fn_product),
            FunctionDef::eager("RAND", 0, Some(0), math::fn_rand).volatile(),
            FunctionDef::eager("RANDBETWEEN", 2, Some(2), math::fn_randbetween).volatile(),
            FunctionDef::lazy("SUBTOTAL", 2, None, subtotal::fn_subtotal),
        ]);
    }

    fn register_trig_functions(&mut self) {
        self.register_all([
            FunctionDef::eager("SIN", 1, Some(1), trig::fn_sin),
            FunctionDef::eager("COS", 1, Some(1), trig::fn_cos),
            FunctionDef::eager("TAN", 1, Some(1), trig::fn_tan),
            FunctionDef::eager("CSC", 1, Some(1), trig::fn_csc),
            FunctionDef::eager("CSCH", 1, Some(1), trig::fn_csch),
            FunctionDef::eager("SEC", 1, Some(1), trig::fn_sec),
            FunctionDef::eager("SECH", 1, Some(1), trig::fn_sech),
            FunctionDef::eager("COT", 1, Some(1), trig::fn_cot),
            FunctionDef::eager("COTH", 1, Some(1), trig::fn_coth),
        ]);
    }

    fn register_statistical_functions(&mut self) {
        self.register_all([
            FunctionDef::eager("STANDARDIZE", 3, Some(3), statistical::fn_standardize),
            FunctionDef::eager("AVERAGE", 1, None, statistical::fn_average),
            FunctionDef::eager("AVERAGEA", 1, None, statistical::fn_averagea),
            FunctionDef::eager("COUNT", 1, None, statistical::fn_count),
            FunctionDef::eager("COUNTA", 1, None, statistical::fn_counta),
            FunctionDef::eager("COUNTBLANK", 1, Some(1), statistical::fn_countblank),
            FunctionDef::eager("MAX", 1, None, statistical::fn_max),
            FunctionDef::eager("MAXA", 1, None, statistical::fn_maxa),
            FunctionDef::eager("MIN", 1, None, statistical::fn_min),
            FunctionDef::eager("MINA", 1, None, statistical::fn_mina),
            FunctionDef::eager("STDEV", 1, None, statistical::fn_stdev),
            FunctionDef::eager("STDEVA", 1, None, statistical::fn_stdeva),
            FunctionDef::eager("STDEVP", 1, None, statistical::fn_stdevp),
            FunctionDef::eager("STDEVPA", 1, None, statistical::fn_stdevpa),
            FunctionDef::eager("VAR", 1, None, statistical::fn_var),
            FunctionDef::eager("VARA", 1, None, statistical::fn_vara),
            FunctionDef::eager("VARP", 1, None, statistical::fn_varp),
            FunctionDef::eager("VARPA", 1, None, statistical::fn_varpa),
            FunctionDef::eager("NORM.S.INV", 1, Some(1), statistical::fn_norm_s_inv),
            FunctionDef::eager("NORMSINV", 1, Some(1), statistical::fn_norm_s_inv),
            FunctionDef::eager("NORM.INV", 3, Some(3), statistical::fn_norm_inv),
            FunctionDef::eager("NORMINV", 3, Some(3), statistical::fn_norm_inv),
        ]);
    }

    fn register_lookup_functions(&mut self) {
        self.register_all([
            FunctionDef::eager("INDEX", 2, Some(3), lookup::fn_index),
            FunctionDef::eager("CHOOSE", 2, None, lookup::fn_choose),
            FunctionDef::lazy("ROWS", 1, Some(1), lookup::fn_rows),
            FunctionDef::lazy("COLUMNS", 1, Some(1), lookup::fn_columns),
        ]);
    }

    fn register_text_functions(&mut self) {
        self.register_all([
            FunctionDef::eager("LEN", 1, Some(1), text::fn_len),
            FunctionDef::eager("LEFT", 1, Some(2), text::fn_left),
            FunctionDef::eager("RIGHT", 1, Some(2), text::fn_right),
            FunctionDef::eager("MID", 3, Some(3), text::fn_mid),
            FunctionDef::eager("REPT", 2, Some(2), text::fn_rept),
            FunctionDef::eager("UPPER", 1, Some(1), text::fn_upper),
            FunctionDef::eager("LOWER", 1, Some(1), text::fn_lower),
            FunctionDef::eager("TRIM", 1, Some(1), text::fn_trim),
            FunctionDef::eager("EXACT", 2, Some(2), text::fn_exact),
            FunctionDef::eager("CONCATENATE", 1, None, text::fn_concatenate),
            FunctionDef::eager("CONCAT", 1, None, text::fn_concat),
        ]);
    }

    fn register_engineering_functions(&mut self) {
        self.register_all([
            FunctionDef::eager("DEC2BIN", 1, Some(2), engineering::fn_dec2bin),
            FunctionDef::eager("DEC2OCT", 1, Some(2), engineering::fn_dec2oct),
            FunctionDef::eager("DEC2HEX", 1, Some(2), engineering::fn_dec2hex),
            FunctionDef::eager("BIN2DEC", 1, Some(1), engineering::fn_bin2dec),
            FunctionDef::eager("OCT2DEC", 1, Some(1), engineering::fn_oct2dec),
            FunctionDef::eager("HEX2DEC", 1, Some(1), engineering::fn_hex2dec),
            FunctionDef::eager("BIN2OCT", 1, Some(2), engineering::fn_bin2oct),
            FunctionDef::eager("BIN2HEX", 1, Some(2), engineering::fn_bin2hex),
            FunctionDef::eager("OCT2BIN", 1, Some(2), engineering::fn_oct2bin),
            FunctionDef::eager("OCT2HEX", 1, Some(2), engineering::fn_oct2hex),
            FunctionDef::eager("HEX2BIN", 1, Some(2), engineering::fn_hex2bin),
            FunctionDef::eager("HEX2OCT", 1, Some(2), engineering::fn_hex2oct),
        ]);
    }

    fn register_financial_functions(&mut self) {
        self.register_all([
            FunctionDef::eager("PV", 3, Some(5), financial::fn_pv),
            FunctionDef::eager("FV", 3, Some(5), financial::fn_fv),
            FunctionDef::eager("PMT", 3, Some(5), financial::fn_pmt),
            FunctionDef::eager("NPER", 3, Some(5), financial::fn_nper),
            FunctionDef::eager("DISC", 4, Some(5), financial::fn_disc),
            FunctionDef::eager("PRICEDISC", 4, Some(5), financial::fn_pricedisc),
            FunctionDef::eager("RECEIVED", 4, Some(5), financial::fn_received),
            FunctionDef::eager("INTRATE", 4, Some(5), financial::fn_intrate),
            FunctionDef::eager("YIELDDISC", 4, Some(5), financial::fn_yielddisc),
        ]);
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static BUILTIN_FUNCTIONS: OnceLock<FunctionRegistry> = OnceLock::new();

/// The shared registry of built-in functions (built on first use)
pub fn builtin_functions() -> &'static FunctionRegistry {
    BUILTIN_FUNCTIONS.get_or_init(FunctionRegistry::new)
}

/// Argument `index`, or [`Value::Empty`] when it was not supplied
pub(crate) fn arg(args: &[Value], index: usize) -> &Value {
    static MISSING: Value = Value::Empty;
    args.get(index).unwrap_or(&MISSING)
}

/// Argument `index` if it was supplied and not left blank
pub(crate) fn optional_arg(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index).filter(|value| !value.is_empty())
}
