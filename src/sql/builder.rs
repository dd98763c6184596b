//! Builds routine invocation text: validated routine name, named arguments, typed placeholders.

use crate::error::CommandError;
use crate::sql::params::{Direction, ProcedureParam, SqlValue};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// How the routine is invoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoutineKind {
    /// `SELECT * FROM name(...)`: set-returning function, one row per result row.
    #[default]
    Function,
    /// `CALL name(...)`: procedure; OUT arguments come back as a single row.
    Procedure,
}

/// Routine name plus invocation kind. `"schema.name"` converts into a function routine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Routine {
    pub name: String,
    pub kind: RoutineKind,
}

impl Routine {
    pub fn function(name: impl Into<String>) -> Self {
        Routine {
            name: name.into(),
            kind: RoutineKind::Function,
        }
    }

    pub fn procedure(name: impl Into<String>) -> Self {
        Routine {
            name: name.into(),
            kind: RoutineKind::Procedure,
        }
    }
}

impl From<&str> for Routine {
    fn from(name: &str) -> Self {
        Routine::function(name)
    }
}

impl From<String> for Routine {
    fn from(name: String) -> Self {
        Routine::function(name)
    }
}

/// Invocation text and the values for `$1..$n`, in order.
pub struct ProcedureCall<'a> {
    pub sql: String,
    pub values: Vec<&'a SqlValue>,
}

fn routine_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*)?$").expect("routine name pattern")
    })
}

fn param_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("parameter name pattern"))
}

/// Unquoted identifiers only, so names fold to lower case the same way they did at `CREATE` time.
pub fn validate_routine_name(name: &str) -> Result<(), CommandError> {
    if routine_name_re().is_match(name) {
        Ok(())
    } else {
        Err(CommandError::InvalidRoutineName(name.to_string()))
    }
}

pub fn build_call<'a>(routine: &Routine, params: &'a [ProcedureParam]) -> Result<ProcedureCall<'a>, CommandError> {
    validate_routine_name(&routine.name)?;

    let mut seen = HashSet::new();
    let mut args = Vec::new();
    let mut values = Vec::new();
    for p in params {
        let name = p.call_name();
        if !param_name_re().is_match(name) {
            return Err(CommandError::InvalidParameterName(p.name.clone()));
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(CommandError::DuplicateParameter(p.name.clone()));
        }
        let ty = p.sql_type.pg_name();
        match (routine.kind, p.direction) {
            (_, Direction::Input) | (_, Direction::InputOutput) => {
                values.push(&p.value);
                args.push(format!("{} => ${}::{}", name, values.len(), ty));
            }
            (RoutineKind::Procedure, Direction::Output) => {
                args.push(format!("{} => NULL::{}", name, ty));
            }
            (RoutineKind::Function, Direction::Output) | (_, Direction::ReturnValue) => {}
        }
    }

    let sql = match routine.kind {
        RoutineKind::Function => format!("SELECT * FROM {}({})", routine.name, args.join(", ")),
        RoutineKind::Procedure => format!("CALL {}({})", routine.name, args.join(", ")),
    };
    Ok(ProcedureCall { sql, values })
}
