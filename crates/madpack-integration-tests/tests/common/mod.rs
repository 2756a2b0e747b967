//! Shared test harness for integration tests.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use madpack_build::{
    BuildLayout, BuildTool, GENERATED_FILE_NAME, MethodBuilder, ToolStatus, WorkingContext,
};
use madpack_config::{BuildConfig, INSTALL_DESCRIPTOR_FILE, MethodSpec};
use tempfile::TempDir;

/// Template covering every placeholder.
pub const TEMPLATE: &str = "\
SCHEMA = SCHEMA_PLACEHOLDER
PYTHON_LIBDIR = PLPYTHON_LIBDIR
M4FLAGS = CONFDEFS
DBAPI2 = DBAPI2_PLACEHOLDER
";

/// One recorded build tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Directory the tool ran in.
    pub dir: PathBuf,
    /// Build target.
    pub command: String,
    /// Verbose flag passed through.
    pub verbose: bool,
    /// Contents of the generated config file at invocation time.
    pub generated: Option<String>,
}

/// Build tool double that records invocations instead of running anything.
#[derive(Debug, Default)]
pub struct RecordingTool {
    invocations: RefCell<Vec<Invocation>>,
    exit_code: i32,
}

#[allow(dead_code)]
impl RecordingTool {
    /// A tool whose every run exits with `code`.
    pub fn exiting_with(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    /// Invocations so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }
}

impl BuildTool for RecordingTool {
    fn program(&self) -> &str {
        "recording-make"
    }

    fn invoke(&self, dir: &Path, command: &str, verbose: bool) -> std::io::Result<ToolStatus> {
        self.invocations.borrow_mut().push(Invocation {
            dir: dir.to_path_buf(),
            command: command.to_owned(),
            verbose,
            generated: std::fs::read_to_string(dir.join(GENERATED_FILE_NAME)).ok(),
        });
        Ok(ToolStatus::from_code(self.exit_code))
    }
}

/// An installation root on disk: `config/config.mk` plus one source
/// directory per method under `methods/`.
///
/// The tempdir is cleaned up when the tree is dropped.
pub struct MethodTree {
    root: TempDir,
    methods: Vec<MethodSpec>,
}

#[allow(dead_code)]
impl MethodTree {
    /// Empty tree with the shared template in place.
    pub fn new() -> Self {
        let root = TempDir::new().expect("failed to create tempdir");
        let config_dir = root.path().join("config");
        std::fs::create_dir_all(&config_dir).expect("failed to create config dir");
        std::fs::write(config_dir.join("config.mk"), TEMPLATE).expect("failed to write template");
        Self {
            root,
            methods: Vec::new(),
        }
    }

    /// Add a method whose `Install.yml` has the given raw contents.
    pub fn with_descriptor(mut self, name: &str, descriptor: &str) -> Self {
        let spec = MethodSpec::new(name, "pg_gp");
        let dir = spec.source_dir(&self.methods_root());
        std::fs::create_dir_all(&dir).expect("failed to create method dir");
        std::fs::write(dir.join(INSTALL_DESCRIPTOR_FILE), descriptor)
            .expect("failed to write descriptor");
        self.methods.push(spec);
        self
    }

    /// Add a method installing `module`, or nothing for `None`.
    pub fn with_method(self, name: &str, module: Option<&str>) -> Self {
        let descriptor = match module {
            Some(module) => format!("module: {module}\n"),
            None => "module: null\n".to_owned(),
        };
        self.with_descriptor(name, &descriptor)
    }

    /// List a method in the manifest without creating its directory.
    pub fn with_missing_method(mut self, name: &str) -> Self {
        self.methods.push(MethodSpec::new(name, "pg_gp"));
        self
    }

    /// Installation root.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Directory holding the method trees.
    pub fn methods_root(&self) -> PathBuf {
        self.root().join("methods")
    }

    /// Source directory of a listed method.
    pub fn source_dir(&self, name: &str) -> PathBuf {
        MethodSpec::new(name, "pg_gp").source_dir(&self.methods_root())
    }

    /// Generated config path of a listed method.
    pub fn generated(&self, name: &str) -> PathBuf {
        self.source_dir(name).join(GENERATED_FILE_NAME)
    }

    /// Manifest listing every added method in order.
    pub fn config(&self) -> BuildConfig {
        BuildConfig {
            target_schema: "madlib".to_owned(),
            plpython_libdir: "/usr/local/lib/python2.6".to_owned(),
            prep_flags: "-DGREENPLUM".to_owned(),
            dbapi2: "pygresql".to_owned(),
            methods: self.methods.clone(),
        }
    }

    /// Builder over this tree with the given tool.
    pub fn builder<T: BuildTool>(&self, tool: T) -> MethodBuilder<T> {
        MethodBuilder::new(BuildLayout::from_root(self.root()), tool)
    }

    /// Working context rooted at the installation root.
    pub fn context(&self) -> WorkingContext {
        WorkingContext::new(self.root())
    }

    /// Every file path under the root, relative to it.
    pub fn snapshot(&self) -> BTreeSet<PathBuf> {
        let mut files = BTreeSet::new();
        collect(self.root(), self.root(), &mut files);
        files
    }
}

fn collect(base: &Path, dir: &Path, out: &mut BTreeSet<PathBuf>) {
    for entry in std::fs::read_dir(dir).expect("failed to read dir") {
        let path = entry.expect("failed to read entry").path();
        if path.is_dir() {
            collect(base, &path, out);
        } else {
            out.insert(
                path.strip_prefix(base)
                    .expect("entry outside base")
                    .to_path_buf(),
            );
        }
    }
}
