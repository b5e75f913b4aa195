//! The built-in rule library.
//!
//! Every built-in is a native-bound factory whose implementation is registered
//! under a `builtin.*` identifier. Composed rules are built from these.
pub mod matchers;
pub mod replacers;
mod pattern;

use crate::instance::{Arguments, BuildError, InstanceKind, NativeRule};
use crate::store::{InstanceFactory, Registry};
use crate::types::{ParamInfo, ParamType};

type Constructor = fn(&Arguments<'_>) -> Result<NativeRule, BuildError>;

struct Builtin {
    name: &'static str,
    description: &'static str,
    output: InstanceKind,
    params: fn() -> Vec<ParamInfo>,
    build: Constructor,
}

fn text(name: &str) -> ParamInfo { ParamInfo::new(name, ParamType::String) }
fn int(name: &str) -> ParamInfo { ParamInfo::new(name, ParamType::Int) }
fn real(name: &str) -> ParamInfo { ParamInfo::new(name, ParamType::Real) }
fn matcher(name: &str) -> ParamInfo { ParamInfo::new(name, ParamType::Matcher) }

const BUILTINS: &[Builtin] = &[
    // --- Matchers ---
    Builtin {
        name: "Exact",
        description: "Input equals the expected text exactly",
        output: InstanceKind::Matcher,
        params: || vec![text("input"), text("against")],
        build: matchers::exact,
    },
    Builtin {
        name: "String=",
        description: "Input equals the expected text, ignoring surrounding whitespace",
        output: InstanceKind::Matcher,
        params: || vec![text("input"), text("against")],
        build: matchers::string_equals,
    },
    Builtin {
        name: "Regex",
        description: "The whole input matches a regular expression",
        output: InstanceKind::Matcher,
        params: || vec![text("input"), text("pattern")],
        build: matchers::regex,
    },
    Builtin {
        name: "IntRange",
        description: "Input is an integer within the inclusive bounds",
        output: InstanceKind::Matcher,
        params: || vec![int("input"), int("min").optional(), int("max").optional()],
        build: matchers::int_range,
    },
    Builtin {
        name: "RealRange",
        description: "Input is a number within the inclusive bounds",
        output: InstanceKind::Matcher,
        params: || vec![real("input"), real("min").optional(), real("max").optional()],
        build: matchers::real_range,
    },
    Builtin {
        name: "Length",
        description: "Input length in characters is within the inclusive bounds",
        output: InstanceKind::Matcher,
        params: || vec![text("input"), int("min").optional(), int("max").optional()],
        build: matchers::length,
    },
    Builtin {
        name: "IsInt",
        description: "Input parses as an integer",
        output: InstanceKind::Matcher,
        params: || vec![text("input")],
        build: matchers::is_int,
    },
    Builtin {
        name: "IsReal",
        description: "Input parses as a number",
        output: InstanceKind::Matcher,
        params: || vec![text("input")],
        build: matchers::is_real,
    },
    Builtin {
        name: "Empty",
        description: "Input is blank",
        output: InstanceKind::Matcher,
        params: || vec![text("input")],
        build: matchers::empty,
    },
    Builtin {
        name: "Not",
        description: "Negates a matcher",
        output: InstanceKind::Matcher,
        params: || vec![matcher("matcher")],
        build: matchers::not,
    },
    Builtin {
        name: "All",
        description: "Every matcher matches",
        output: InstanceKind::Matcher,
        params: || vec![matcher("matchers").array()],
        build: matchers::all,
    },
    Builtin {
        name: "Any",
        description: "At least one matcher matches",
        output: InstanceKind::Matcher,
        params: || vec![matcher("matchers").array()],
        build: matchers::any,
    },
    Builtin {
        name: "OneOf",
        description: "Input equals one of the options",
        output: InstanceKind::Matcher,
        params: || vec![text("input"), text("options").array()],
        build: matchers::one_of,
    },
    // --- Replacers ---
    Builtin {
        name: "Literal",
        description: "Replaces with a fixed value",
        output: InstanceKind::Replacer,
        params: || vec![text("value")],
        build: replacers::literal,
    },
    Builtin {
        name: "Trim",
        description: "Strips surrounding whitespace",
        output: InstanceKind::Replacer,
        params: || vec![text("input")],
        build: replacers::trim,
    },
    Builtin {
        name: "Upper",
        description: "Converts to upper case",
        output: InstanceKind::Replacer,
        params: || vec![text("input")],
        build: replacers::upper,
    },
    Builtin {
        name: "Lower",
        description: "Converts to lower case",
        output: InstanceKind::Replacer,
        params: || vec![text("input")],
        build: replacers::lower,
    },
    Builtin {
        name: "Concat",
        description: "Joins the parts in order",
        output: InstanceKind::Replacer,
        params: || vec![text("parts").array()],
        build: replacers::concat,
    },
    Builtin {
        name: "RegexReplace",
        description: "Replaces every match of a regular expression",
        output: InstanceKind::Replacer,
        params: || vec![text("input"), text("pattern"), text("replacement")],
        build: replacers::regex_replace,
    },
    Builtin {
        name: "ClampInt",
        description: "Clamps an integer into the inclusive bounds",
        output: InstanceKind::Replacer,
        params: || vec![int("input"), int("min").optional(), int("max").optional()],
        build: replacers::clamp_int,
    },
];

fn native_id(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| match c {
            '=' => "_eq".to_string(),
            c => c.to_lowercase().to_string(),
        })
        .collect();
    format!("builtin.{slug}")
}

/// Registers every built-in implementation and factory.
pub fn install(registry: &mut Registry) {
    for builtin in BUILTINS {
        let id = native_id(builtin.name);
        registry.register_native(id.clone(), builtin.build);
        registry.insert(InstanceFactory::native(
            builtin.name,
            builtin.description,
            builtin.output,
            (builtin.params)(),
            id,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Exact", "builtin.exact")]
    #[case("String=", "builtin.string_eq")]
    #[case("RegexReplace", "builtin.regexreplace")]
    fn test_native_ids(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(native_id(name), expected);
    }

    #[test]
    fn test_install_registers_every_builtin() {
        let registry = Registry::with_builtins();
        assert_eq!(registry.count(), BUILTINS.len());
        assert_eq!(registry.factory("String=").unwrap().output(), InstanceKind::Matcher);
        assert_eq!(registry.factory("ClampInt").unwrap().output(), InstanceKind::Replacer);
    }
}
