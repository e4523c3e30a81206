use super::matcher::Matcher;
use indexmap::IndexMap;

const LUA_STANDARD: &[(&str, &[&str])] = &[
    (
        "string",
        &[
            "byte", "char", "dump", "find", "format", "gmatch", "gsub", "len", "lower", "match",
            "pack", "packsize", "rep", "reverse", "sub", "unpack", "upper",
        ],
    ),
    (
        "table",
        &["concat", "insert", "move", "pack", "remove", "sort", "unpack"],
    ),
    (
        "math",
        &[
            "abs", "acos", "asin", "atan", "ceil", "cos", "deg", "exp", "floor", "fmod", "huge",
            "log", "max", "maxinteger", "min", "mininteger", "modf", "pi", "rad", "random",
            "randomseed", "sin", "sqrt", "tan", "tointeger", "type", "ult",
        ],
    ),
    (
        "os",
        &[
            "clock", "date", "difftime", "execute", "exit", "getenv", "remove", "rename",
            "setlocale", "time", "tmpname",
        ],
    ),
    (
        "io",
        &[
            "close", "flush", "input", "lines", "open", "output", "popen", "read", "stderr",
            "stdin", "stdout", "tmpfile", "type", "write",
        ],
    ),
    (
        "coroutine",
        &[
            "close", "create", "isyieldable", "resume", "running", "status", "wrap", "yield",
        ],
    ),
    (
        "utf8",
        &["char", "charpattern", "codepoint", "codes", "len", "offset"],
    ),
    (
        "debug",
        &[
            "debug", "gethook", "getinfo", "getlocal", "getmetatable", "getregistry",
            "getupvalue", "getuservalue", "sethook", "setlocal", "setmetatable", "setupvalue",
            "setuservalue", "traceback", "upvalueid", "upvaluejoin",
        ],
    ),
];

/// Package name → function names, for `pkg.func` completion.
#[derive(Debug, Clone, Default)]
pub struct PackageTable {
    packages: IndexMap<String, Vec<String>>,
}

impl PackageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lua_standard() -> Self {
        let mut table = Self::new();
        for (package, functions) in LUA_STANDARD {
            table.insert(*package, functions.iter().map(|f| f.to_string()).collect());
        }
        table
    }

    /// Register a package, replacing an earlier table of the same name.
    pub fn insert(&mut self, package: impl Into<String>, functions: Vec<String>) {
        self.packages.insert(package.into(), functions);
    }

    /// Functions of `package` under the given comparison rule. An exact
    /// key match wins over a case-folded one.
    pub fn lookup(&self, matcher: &Matcher, package: &str) -> Option<&[String]> {
        if let Some(functions) = self.packages.get(package) {
            return Some(functions);
        }
        self.packages
            .iter()
            .find(|(name, _)| matcher.eq(name, package))
            .map(|(_, functions)| functions.as_slice())
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
