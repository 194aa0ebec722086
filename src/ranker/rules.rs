//! Static scoring tables.
//!
//! Each tier is one row of [`RULES`]; a file takes the score of the first
//! row with any matching [`Matcher`]. Exclusions are checked before the
//! table and always win.

use crate::models::Tier;

/// Media, archive, and compiled-artifact extensions.
pub const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "svg", "webp", "bmp", //
    "woff", "woff2", "ttf", "eot", "otf", //
    "mp3", "mp4", "wav", "mov", "avi", //
    "zip", "tar", "gz", "bz2", "xz", "7z", "rar", "jar", //
    "pdf", "exe", "dll", "so", "dylib", "a", "lib", //
    "pyc", "class", "o", "obj", "wasm", //
    "bin", "dat", "db", "sqlite",
];

/// Dependency lock files, matched case-insensitively on the filename.
pub const LOCK_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "pipfile.lock",
    "poetry.lock",
    "composer.lock",
    "gemfile.lock",
    "cargo.lock",
    "go.sum",
    "bun.lockb",
    "uv.lock",
];

/// Generated or vendored directory names, matched as whole path segments.
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "dist",
    "build",
    ".next",
    "__pycache__",
    ".git",
    ".idea",
    ".vscode",
    "venv",
    ".venv",
    ".env",
    "env",
    ".tox",
    "coverage",
    ".nyc_output",
    "target",
];

/// Minified, sourcemap, and type-declaration suffixes.
pub const GENERATED_SUFFIXES: &[&str] = &[".min.js", ".min.css", ".map", ".d.ts"];

const README_NAMES: &[&str] = &[
    "readme",
    "readme.md",
    "readme.markdown",
    "readme.rst",
    "readme.txt",
    "readme.adoc",
];

const MANIFEST_FILES: &[&str] = &[
    "package.json",
    "pyproject.toml",
    "setup.py",
    "setup.cfg",
    "requirements.txt",
    "cargo.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "gemfile",
    "composer.json",
    "cmakelists.txt",
    "makefile",
    "meson.build",
];

const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx"];

const INFRA_FILES: &[&str] = &[
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    ".gitlab-ci.yml",
    "jenkinsfile",
];

const YAML_EXTENSIONS: &[&str] = &["yml", "yaml"];

const APP_CONFIG_FILES: &[&str] = &[
    ".env.example",
    "config.yaml",
    "config.yml",
    "config.json",
    "config.toml",
    "settings.py",
    "tsconfig.json",
    "webpack.config.js",
    "vite.config.ts",
    "vite.config.js",
    "next.config.js",
    "tailwind.config.js",
];

const ENTRY_POINT_FILES: &[&str] = &[
    "main.py",
    "app.py",
    "index.ts",
    "index.js",
    "main.go",
    "main.rs",
    "main.java",
    "program.cs",
];

/// Directories whose direct subpackages count as top-level packages.
const SOURCE_ROOTS: &[&str] = &["src", "lib"];

const DOC_FILES: &[&str] = &[
    "contributing.md",
    "changelog.md",
    "license",
    "license.md",
    "architecture.md",
];

const DOC_EXTENSIONS: &[&str] = &["md", "markdown", "rst", "txt", "adoc"];

const TEST_DIRS: &[&str] = &["test", "tests", "spec", "__tests__"];

const TEST_PREFIXES: &[&str] = &["test_"];

const TEST_SUFFIXES: &[&str] = &[
    "_test.py",
    "_test.go",
    ".test.js",
    ".test.ts",
    ".spec.ts",
    ".spec.js",
];

const LINT_FILES: &[&str] = &[
    ".eslintrc",
    ".prettierrc",
    ".editorconfig",
    ".babelrc",
    ".browserslistrc",
];

const LINT_PREFIXES: &[&str] = &[".eslintrc", ".prettierrc"];

const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "go", "rs", "java", "c", "cpp", "cc", "h", "rb", "php",
    "swift", "kt", "scala", "ex", "exs", "clj", "hs", "cs",
];

/// Path facts every matcher works from, computed once per file.
#[derive(Debug, Clone)]
pub struct PathInfo {
    /// Lowercased full path.
    pub lower: String,
    /// Lowercased directory segments, root first (filename excluded).
    pub dirs: Vec<String>,
    /// Lowercased filename.
    pub name: String,
    /// Lowercased extension without the dot; empty for none or dotfiles.
    pub ext: String,
}

impl PathInfo {
    pub fn new(path: &str) -> Self {
        let lower = path.to_lowercase();
        let mut segments: Vec<String> = lower
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let name = segments.pop().unwrap_or_default();
        let ext = match name.rfind('.') {
            Some(idx) if idx > 0 => name[idx + 1..].to_string(),
            _ => String::new(),
        };
        Self {
            lower,
            dirs: segments,
            name,
            ext,
        }
    }

    /// Number of slashes in the path.
    pub fn depth(&self) -> usize {
        self.lower.matches('/').count()
    }

    pub fn is_root(&self) -> bool {
        self.dirs.is_empty()
    }

    fn has_dir(&self, dir: &str) -> bool {
        self.dirs.iter().any(|d| d == dir)
    }
}

/// A single predicate over a path.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Exact filename.
    Names(&'static [&'static str]),
    /// Filename prefix.
    NamePrefixes(&'static [&'static str]),
    /// Filename suffix.
    NameSuffixes(&'static [&'static str]),
    /// Extension anywhere in the tree.
    Extensions(&'static [&'static str]),
    /// Extension with a directory segment of the given name somewhere above it.
    ExtensionsUnderDir {
        dir: &'static str,
        exts: &'static [&'static str],
    },
    /// Extension below a root-anchored path prefix.
    ExtensionsUnderPrefix {
        prefix: &'static str,
        exts: &'static [&'static str],
    },
    /// Any directory segment in the set.
    DirSegments(&'static [&'static str]),
    /// `__init__.py` of a top-level package: `pkg/__init__.py`, or one
    /// directory below a source root such as `src/pkg/__init__.py`.
    PackageInit,
}

impl Matcher {
    pub fn matches(&self, info: &PathInfo) -> bool {
        match *self {
            Matcher::Names(names) => names.contains(&info.name.as_str()),
            Matcher::NamePrefixes(prefixes) => prefixes.iter().any(|p| info.name.starts_with(p)),
            Matcher::NameSuffixes(suffixes) => suffixes.iter().any(|s| info.name.ends_with(s)),
            Matcher::Extensions(exts) => exts.contains(&info.ext.as_str()),
            Matcher::ExtensionsUnderDir { dir, exts } => {
                exts.contains(&info.ext.as_str()) && info.has_dir(dir)
            }
            Matcher::ExtensionsUnderPrefix { prefix, exts } => {
                exts.contains(&info.ext.as_str()) && info.lower.starts_with(prefix)
            }
            Matcher::DirSegments(dirs) => info.dirs.iter().any(|d| dirs.contains(&d.as_str())),
            Matcher::PackageInit => {
                info.name == "__init__.py"
                    && match info.dirs.as_slice() {
                        [_] => true,
                        [root, _] => SOURCE_ROOTS.contains(&root.as_str()),
                        _ => false,
                    }
            }
        }
    }
}

/// How a matching rule turns into a number.
#[derive(Debug, Clone, Copy)]
pub enum Score {
    Fixed(u8),
    /// Different scores at the repository root and below it.
    RootOrNested { root: u8, nested: u8 },
    /// `base - min(size / bytes_per_point, max_penalty)`.
    SizePenalized {
        base: u8,
        bytes_per_point: u64,
        max_penalty: u8,
    },
}

impl Score {
    pub fn evaluate(&self, info: &PathInfo, size_bytes: u64) -> u8 {
        match *self {
            Score::Fixed(score) => score,
            Score::RootOrNested { root, nested } => {
                if info.is_root() {
                    root
                } else {
                    nested
                }
            }
            Score::SizePenalized {
                base,
                bytes_per_point,
                max_penalty,
            } => {
                let penalty = (size_bytes / bytes_per_point).min(u64::from(max_penalty)) as u8;
                base.saturating_sub(penalty)
            }
        }
    }
}

/// One row of the scoring table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub tier: Tier,
    pub any_of: &'static [Matcher],
    pub score: Score,
}

impl Rule {
    pub fn matches(&self, info: &PathInfo) -> bool {
        self.any_of.iter().any(|m| m.matches(info))
    }
}

/// The scoring table, in precedence order.
pub static RULES: &[Rule] = &[
    Rule {
        tier: Tier::Readme,
        any_of: &[Matcher::Names(README_NAMES)],
        score: Score::RootOrNested {
            root: 100,
            nested: 80,
        },
    },
    Rule {
        tier: Tier::Manifest,
        any_of: &[Matcher::Names(MANIFEST_FILES)],
        score: Score::Fixed(90),
    },
    Rule {
        tier: Tier::Header,
        any_of: &[Matcher::ExtensionsUnderDir {
            dir: "include",
            exts: HEADER_EXTENSIONS,
        }],
        score: Score::Fixed(85),
    },
    Rule {
        tier: Tier::Infra,
        any_of: &[
            Matcher::Names(INFRA_FILES),
            Matcher::ExtensionsUnderPrefix {
                prefix: ".github/workflows/",
                exts: YAML_EXTENSIONS,
            },
            Matcher::Extensions(&["tf"]),
            Matcher::ExtensionsUnderPrefix {
                prefix: "k8s/",
                exts: YAML_EXTENSIONS,
            },
        ],
        score: Score::Fixed(80),
    },
    Rule {
        tier: Tier::AppConfig,
        any_of: &[Matcher::Names(APP_CONFIG_FILES)],
        score: Score::Fixed(75),
    },
    Rule {
        tier: Tier::EntryPoint,
        any_of: &[Matcher::Names(ENTRY_POINT_FILES), Matcher::PackageInit],
        score: Score::Fixed(70),
    },
    Rule {
        tier: Tier::Docs,
        any_of: &[
            Matcher::Names(DOC_FILES),
            Matcher::ExtensionsUnderDir {
                dir: "docs",
                exts: DOC_EXTENSIONS,
            },
        ],
        score: Score::Fixed(50),
    },
    Rule {
        tier: Tier::Test,
        any_of: &[
            Matcher::DirSegments(TEST_DIRS),
            Matcher::NamePrefixes(TEST_PREFIXES),
            Matcher::NameSuffixes(TEST_SUFFIXES),
        ],
        score: Score::Fixed(30),
    },
    Rule {
        tier: Tier::LintConfig,
        any_of: &[Matcher::Names(LINT_FILES), Matcher::NamePrefixes(LINT_PREFIXES)],
        score: Score::Fixed(10),
    },
    Rule {
        tier: Tier::Source,
        any_of: &[Matcher::Extensions(SOURCE_EXTENSIONS)],
        score: Score::SizePenalized {
            base: 60,
            bytes_per_point: 5000,
            max_penalty: 20,
        },
    },
];

/// Why a file was dropped before the scoring table was consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Exclusion {
    BinaryExtension,
    LockFile,
    GeneratedDir,
    GeneratedSuffix,
    TooLarge,
    TooDeep,
}

/// Hard exclusions. Size and depth ceilings come from configuration.
pub fn exclusion(
    info: &PathInfo,
    size_bytes: u64,
    max_file_size: u64,
    max_depth: usize,
) -> Option<Exclusion> {
    if BINARY_EXTENSIONS.contains(&info.ext.as_str()) {
        return Some(Exclusion::BinaryExtension);
    }
    if LOCK_FILES.contains(&info.name.as_str()) {
        return Some(Exclusion::LockFile);
    }
    if info.dirs.iter().any(|d| SKIP_DIRS.contains(&d.as_str())) {
        return Some(Exclusion::GeneratedDir);
    }
    if GENERATED_SUFFIXES.iter().any(|s| info.name.ends_with(s)) {
        return Some(Exclusion::GeneratedSuffix);
    }
    if size_bytes > max_file_size {
        return Some(Exclusion::TooLarge);
    }
    if info.depth() > max_depth {
        return Some(Exclusion::TooDeep);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match(path: &str, size: u64) -> Option<(Tier, u8)> {
        let info = PathInfo::new(path);
        RULES
            .iter()
            .find(|r| r.matches(&info))
            .map(|r| (r.tier, r.score.evaluate(&info, size)))
    }

    #[test]
    fn path_info_splits_segments() {
        let info = PathInfo::new("Src/Pkg/Main.PY");
        assert_eq!(info.dirs, vec!["src", "pkg"]);
        assert_eq!(info.name, "main.py");
        assert_eq!(info.ext, "py");
        assert_eq!(info.depth(), 2);
    }

    #[test]
    fn dotfiles_have_no_extension() {
        assert_eq!(PathInfo::new(".eslintrc").ext, "");
        assert_eq!(PathInfo::new(".env.example").ext, "example");
    }

    #[test]
    fn rules_are_in_tier_order() {
        let tiers: Vec<Tier> = RULES.iter().map(|r| r.tier).collect();
        let mut sorted = tiers.clone();
        sorted.sort_by_key(|t| *t as u8);
        assert_eq!(tiers, sorted);
    }

    #[test]
    fn readme_root_and_nested() {
        assert_eq!(first_match("README.md", 10), Some((Tier::Readme, 100)));
        assert_eq!(first_match("readme", 10), Some((Tier::Readme, 100)));
        assert_eq!(first_match("docs/README.rst", 10), Some((Tier::Readme, 80)));
    }

    #[test]
    fn manifest_rule() {
        assert_eq!(first_match("Cargo.toml", 10), Some((Tier::Manifest, 90)));
        assert_eq!(first_match("web/package.json", 10), Some((Tier::Manifest, 90)));
        assert_eq!(first_match("Makefile", 10), Some((Tier::Manifest, 90)));
    }

    #[test]
    fn header_rule_needs_include_segment() {
        assert_eq!(first_match("include/lib/api.h", 10), Some((Tier::Header, 85)));
        assert_eq!(first_match("src/api.h", 10).map(|m| m.0), Some(Tier::Source));
        assert_eq!(first_match("includes/api.h", 10).map(|m| m.0), Some(Tier::Source));
    }

    #[test]
    fn infra_rule() {
        assert_eq!(first_match("Dockerfile", 10), Some((Tier::Infra, 80)));
        assert_eq!(first_match(".github/workflows/ci.yml", 10), Some((Tier::Infra, 80)));
        assert_eq!(first_match("deploy/main.tf", 10), Some((Tier::Infra, 80)));
        assert_eq!(first_match("k8s/deployment.yaml", 10), Some((Tier::Infra, 80)));
        assert_eq!(first_match("other/k8s/deployment.yaml", 10), None);
    }

    #[test]
    fn app_config_rule() {
        assert_eq!(first_match("tsconfig.json", 10), Some((Tier::AppConfig, 75)));
        assert_eq!(first_match(".env.example", 10), Some((Tier::AppConfig, 75)));
    }

    #[test]
    fn entry_point_rule() {
        assert_eq!(first_match("src/main.rs", 10), Some((Tier::EntryPoint, 70)));
        assert_eq!(first_match("app/__init__.py", 10), Some((Tier::EntryPoint, 70)));
        assert_eq!(first_match("src/app/__init__.py", 10), Some((Tier::EntryPoint, 70)));
        assert_eq!(
            first_match("app/sub/__init__.py", 10).map(|m| m.0),
            Some(Tier::Source)
        );
    }

    #[test]
    fn docs_rule() {
        assert_eq!(first_match("CONTRIBUTING.md", 10), Some((Tier::Docs, 50)));
        assert_eq!(first_match("LICENSE", 10), Some((Tier::Docs, 50)));
        assert_eq!(first_match("docs/guide/setup.md", 10), Some((Tier::Docs, 50)));
        assert_eq!(first_match("notes/setup.md", 10), None);
    }

    #[test]
    fn test_rule() {
        assert_eq!(first_match("tests/test_api.py", 10), Some((Tier::Test, 30)));
        assert_eq!(first_match("src/__tests__/app.tsx", 10), Some((Tier::Test, 30)));
        assert_eq!(first_match("pkg/server_test.go", 10), Some((Tier::Test, 30)));
        assert_eq!(first_match("web/app.spec.ts", 10), Some((Tier::Test, 30)));
        assert_eq!(first_match("testing/helpers.py", 10).map(|m| m.0), Some(Tier::Source));
    }

    #[test]
    fn lint_rule() {
        assert_eq!(first_match(".editorconfig", 10), Some((Tier::LintConfig, 10)));
        assert_eq!(first_match(".eslintrc.json", 10), Some((Tier::LintConfig, 10)));
    }

    #[test]
    fn source_penalty_is_capped() {
        assert_eq!(first_match("src/lib.rs", 0), Some((Tier::Source, 60)));
        assert_eq!(first_match("src/lib.rs", 4_999), Some((Tier::Source, 60)));
        assert_eq!(first_match("src/lib.rs", 5_000), Some((Tier::Source, 59)));
        assert_eq!(first_match("src/lib.rs", 60_000), Some((Tier::Source, 48)));
        assert_eq!(first_match("src/lib.rs", 10_000_000), Some((Tier::Source, 40)));
    }

    #[test]
    fn unmatched_files_have_no_rule() {
        assert_eq!(first_match("data/table.csv", 10), None);
        assert_eq!(first_match("notes.txt", 10), None);
    }

    #[test]
    fn exclusions() {
        let check = |p: &str, size: u64| exclusion(&PathInfo::new(p), size, 100_000, 8);
        assert_eq!(check("assets/logo.PNG", 1), Some(Exclusion::BinaryExtension));
        assert_eq!(check("Cargo.lock", 1), Some(Exclusion::LockFile));
        assert_eq!(check("web/PNPM-LOCK.yaml", 1), Some(Exclusion::LockFile));
        assert_eq!(check("web/node_modules/x/index.js", 1), Some(Exclusion::GeneratedDir));
        assert_eq!(check("static/app.min.js", 1), Some(Exclusion::GeneratedSuffix));
        assert_eq!(check("types/index.d.ts", 1), Some(Exclusion::GeneratedSuffix));
        assert_eq!(check("src/big.rs", 100_001), Some(Exclusion::TooLarge));
        assert_eq!(check("src/big.rs", 100_000), None);
        assert_eq!(check("a/b/c/d/e/f/g/h/i.rs", 1), None);
        assert_eq!(check("a/b/c/d/e/f/g/h/i/j.rs", 1), Some(Exclusion::TooDeep));
    }

    #[test]
    fn skip_dirs_match_whole_segments_only() {
        let check = |p: &str| exclusion(&PathInfo::new(p), 1, 100_000, 8);
        assert_eq!(check("rebuild/main.py"), None);
        assert_eq!(check("src/environment.py"), None);
        assert_eq!(check("build/main.py"), Some(Exclusion::GeneratedDir));
    }
}
