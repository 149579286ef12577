//! Rhai engine implementation.

use std::path::Path;

use rhai::module_resolvers::{FileModuleResolver, ModuleResolversCollection};
use rhai::{Dynamic, Engine, EvalAltResult, Scope};

use grafdash_core::{ClasspathSet, dashboard_name};

use crate::limits::EngineLimits;
use crate::runtime::ScriptEngine;
use crate::types::{ScriptError, ScriptResult};

/// Log target for output produced by dashboard scripts.
const SCRIPT_TARGET: &str = "dashboard_script";

/// Rhai-backed [`ScriptEngine`].
///
/// Helper modules are resolved by `import` from the classpath directories in
/// order, then relative to the importing script.
pub struct RhaiEngine {
    /// The Rhai engine.
    engine: Engine,

    /// Limits the engine was built with.
    limits: EngineLimits,

    /// Classpath installed by the last `initialize`.
    classpath: ClasspathSet,

    /// Whether the engine has been initialized.
    initialized: bool,
}

impl RhaiEngine {
    /// Create an uninitialized engine with default limits.
    pub fn new() -> Self {
        Self::with_limits(EngineLimits::default())
    }

    /// Create an uninitialized engine with custom limits.
    pub fn with_limits(limits: EngineLimits) -> Self {
        let mut engine = Engine::new();

        engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);
        engine.set_max_call_levels(limits.max_call_levels);
        engine.set_max_operations(limits.max_operations);
        engine.set_max_modules(limits.max_modules);
        engine.set_max_string_size(limits.max_string_size);
        engine.set_max_array_size(limits.max_array_size);
        engine.set_max_map_size(limits.max_map_size);

        engine.disable_symbol("eval");

        Self::init_api(&mut engine);

        Self {
            engine,
            limits,
            classpath: ClasspathSet::new(),
            initialized: false,
        }
    }

    /// Create an engine already initialized with a classpath.
    pub fn with_classpath(classpath: &ClasspathSet) -> ScriptResult<Self> {
        let mut engine = Self::new();
        engine.initialize(classpath)?;
        Ok(engine)
    }

    /// Classpath installed by the last `initialize`.
    pub fn classpath(&self) -> &ClasspathSet {
        &self.classpath
    }

    /// Limits the engine was built with.
    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// Register the dashboard helper API.
    fn init_api(engine: &mut Engine) {
        engine.on_print(|text| {
            tracing::info!(target: SCRIPT_TARGET, "{}", text);
        });

        engine.on_debug(|text, source, _pos| {
            tracing::debug!(target: SCRIPT_TARGET, "{} ({})", text, source.unwrap_or("script"));
        });

        engine.register_fn("log_info", |msg: &str| {
            tracing::info!(target: SCRIPT_TARGET, "{}", msg);
        });

        engine.register_fn("log_warn", |msg: &str| {
            tracing::warn!(target: SCRIPT_TARGET, "{}", msg);
        });

        engine.register_fn("log_error", |msg: &str| {
            tracing::error!(target: SCRIPT_TARGET, "{}", msg);
        });

        engine.register_fn(
            "json",
            |value: Dynamic| -> Result<String, Box<EvalAltResult>> {
                serde_json::to_string(&value).map_err(|e| format!("json: {e}").into())
            },
        );

        engine.register_fn(
            "json_pretty",
            |value: Dynamic| -> Result<String, Box<EvalAltResult>> {
                serde_json::to_string_pretty(&value).map_err(|e| format!("json_pretty: {e}").into())
            },
        );

        engine.register_fn(
            "from_json",
            |text: &str| -> Result<Dynamic, Box<EvalAltResult>> {
                let value: serde_json::Value =
                    serde_json::from_str(text).map_err(|e| format!("from_json: {e}"))?;
                rhai::serde::to_dynamic(value)
            },
        );
    }
}

impl Default for RhaiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine for RhaiEngine {
    fn name(&self) -> &'static str {
        "rhai"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["rhai"]
    }

    fn initialize(&mut self, classpath: &ClasspathSet) -> ScriptResult<()> {
        let mut resolvers = ModuleResolversCollection::new();

        for entry in classpath.iter() {
            if entry.is_dir() {
                resolvers.push(FileModuleResolver::new_with_path(entry));
            } else {
                tracing::warn!("Skipping classpath entry that is not a directory: {}", entry.display());
            }
        }

        // Fallback: relative to the importing script.
        resolvers.push(FileModuleResolver::new());

        self.engine.set_module_resolver(resolvers);
        self.classpath = classpath.clone();
        self.initialized = true;

        tracing::debug!(entries = classpath.len(), "Initialized rhai engine");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn evaluate(&self, source: &str, origin: &Path) -> ScriptResult<String> {
        if !self.initialized {
            return Err(ScriptError::NotInitialized { engine: self.name() });
        }

        let mut ast = self.engine.compile(source).map_err(|e| ScriptError::Compile {
            origin: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        ast.set_source(origin.to_string_lossy().into_owned());

        let mut scope = Scope::new();
        scope.push_constant("DASHBOARD_NAME", dashboard_name(origin).unwrap_or_default());
        scope.push_constant("DASHBOARD_FILE", origin.to_string_lossy().into_owned());

        let value = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
            .map_err(|e| ScriptError::Runtime {
                origin: origin.to_path_buf(),
                message: e.to_string(),
            })?;

        if !value.is_string() {
            return Err(ScriptError::NotAString {
                origin: origin.to_path_buf(),
                type_name: value.type_name().to_string(),
            });
        }

        value.into_string().map_err(|type_name| ScriptError::NotAString {
            origin: origin.to_path_buf(),
            type_name: type_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn engine() -> RhaiEngine {
        RhaiEngine::with_classpath(&ClasspathSet::new()).unwrap()
    }

    #[test]
    fn test_string_literal_script() {
        let json = engine()
            .evaluate(r#""{\"b\":2}""#, Path::new("beta.kts"))
            .unwrap();
        assert_eq!(json, r#"{"b":2}"#);
    }

    #[test]
    fn test_json_helper_encodes_maps() {
        let script = r#"
            let panels = [];
            for i in 1..=2 {
                panels.push(#{ id: i, title: `Panel ${i}` });
            }
            json(#{ title: "Latency", panels: panels })
        "#;
        let json = engine().evaluate(script, Path::new("latency.rhai")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "Latency");
        assert_eq!(value["panels"][1]["title"], "Panel 2");
    }

    #[test]
    fn test_from_json_round_trip() {
        let script = r#"
            let d = from_json("{\"a\":1}");
            d.a += 1;
            json(d)
        "#;
        let json = engine().evaluate(script, Path::new("a.rhai")).unwrap();
        assert_eq!(json, r#"{"a":2}"#);
    }

    #[test]
    fn test_dashboard_name_constant() {
        let name = engine()
            .evaluate("DASHBOARD_NAME", Path::new("team/latency.rhai"))
            .unwrap();
        assert_eq!(name, "latency");
    }

    #[test]
    fn test_non_string_result() {
        let err = engine().evaluate("40 + 2", Path::new("n.rhai")).unwrap_err();
        match err {
            ScriptError::NotAString { type_name, .. } => assert_eq!(type_name, "i64"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_syntax_error() {
        let err = engine().evaluate("let = ;", Path::new("bad.rhai")).unwrap_err();
        assert!(matches!(err, ScriptError::Compile { .. }));
    }

    #[test]
    fn test_runtime_error() {
        let err = engine()
            .evaluate(r#"throw "boom";"#, Path::new("throw.rhai"))
            .unwrap_err();
        match err {
            ScriptError::Runtime { message, .. } => assert!(message.contains("boom")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_initialized() {
        let engine = RhaiEngine::new();
        assert!(!engine.is_initialized());
        let err = engine.evaluate(r#""{}""#, Path::new("x.rhai")).unwrap_err();
        assert!(matches!(err, ScriptError::NotInitialized { engine: "rhai" }));
    }

    #[test]
    fn test_operation_limit() {
        let mut engine = RhaiEngine::with_limits(EngineLimits::strict().with_max_operations(1000));
        engine.initialize(&ClasspathSet::new()).unwrap();
        let err = engine.evaluate("loop { }", Path::new("spin.rhai")).unwrap_err();
        assert!(matches!(err, ScriptError::Runtime { .. }));
    }

    #[test]
    fn test_import_from_classpath() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("lib");
        fs::create_dir(&lib).unwrap();
        fs::write(
            lib.join("panels.rhai"),
            r#"fn row(title) { #{ type: "row", title: title } }"#,
        )
        .unwrap();

        let classpath = ClasspathSet::new()
            .with(temp.path().join("missing"))
            .with(&lib);
        let engine = RhaiEngine::with_classpath(&classpath).unwrap();
        assert_eq!(engine.classpath().len(), 2);

        let script = r#"
            import "panels" as p;
            json(#{ panels: [p::row("Errors")] })
        "#;
        let json = engine
            .evaluate(script, &temp.path().join("dash.rhai"))
            .unwrap();
        assert_eq!(json, r#"{"panels":[{"title":"Errors","type":"row"}]}"#);
    }

    #[test]
    fn test_output_is_deterministic() {
        let engine = engine();
        let script = r#"json(#{ z: 1, a: [3, 2, 1], m: #{ y: true, b: () } })"#;
        let first = engine.evaluate(script, Path::new("d.rhai")).unwrap();
        let second = engine.evaluate(script, Path::new("d.rhai")).unwrap();
        assert_eq!(first, second);
    }
}
