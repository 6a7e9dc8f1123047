//! Well-known libraries of the embedded compiler and script runtime.

use crate::config::keys;

/// A library located by name, override property, and a marker class it contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KnownLibrary {
    pub id: &'static str,
    pub file_name: &'static str,
    /// Dedicated override naming the file directly
    pub property: Option<&'static str>,
    /// Fully-qualified name of a class only this library defines
    pub marker_class: &'static str,
}

impl KnownLibrary {
    /// Property a user should set when this library cannot be found
    pub fn hint_property(&self) -> &'static str {
        self.property.unwrap_or(keys::COMPILER_CLASSPATH)
    }
}

/// Resource path of a marker class, e.g. `kotlin/Unit.class`
pub fn marker_resource(fqn: &str) -> String {
    format!("{}.class", fqn.replace('.', "/"))
}

pub const COMPILER: KnownLibrary = KnownLibrary {
    id: "compiler",
    file_name: "kotlin-compiler.jar",
    property: Some(keys::COMPILER_JAR),
    marker_class: "org.jetbrains.kotlin.cli.jvm.K2JVMCompiler",
};

pub const STDLIB: KnownLibrary = KnownLibrary {
    id: "stdlib",
    file_name: "kotlin-stdlib.jar",
    property: Some(keys::STDLIB_JAR),
    marker_class: "kotlin.Unit",
};

pub const REFLECT: KnownLibrary = KnownLibrary {
    id: "reflect",
    file_name: "kotlin-reflect.jar",
    property: Some(keys::REFLECT_JAR),
    marker_class: "kotlin.reflect.full.KClasses",
};

pub const SCRIPT_RUNTIME: KnownLibrary = KnownLibrary {
    id: "script-runtime",
    file_name: "kotlin-script-runtime.jar",
    property: Some(keys::SCRIPT_RUNTIME_JAR),
    marker_class: "kotlin.script.templates.standard.ScriptTemplateWithArgs",
};

pub const TROVE4J: KnownLibrary = KnownLibrary {
    id: "trove4j",
    file_name: "trove4j.jar",
    property: None,
    marker_class: "gnu.trove.THashMap",
};

/// Members of the compiler classpath; the first is the entry point
pub const COMPILER_CLASSPATH: &[KnownLibrary] = &[COMPILER, STDLIB, REFLECT, SCRIPT_RUNTIME, TROVE4J];

/// Libraries a script needs at compile time
pub const SCRIPT_CLASSPATH: &[KnownLibrary] = &[STDLIB, SCRIPT_RUNTIME];

pub const ALL: &[KnownLibrary] = &[COMPILER, STDLIB, REFLECT, SCRIPT_RUNTIME, TROVE4J];

pub fn by_id(id: &str) -> Option<KnownLibrary> {
    ALL.iter().copied().find(|lib| lib.id == id)
}
