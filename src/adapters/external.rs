use super::*;
use crate::{Error, ProcessFailure};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A program plus the leading arguments it is always invoked with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    /// Invoke `program` with no leading arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a leading argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Run the program with its leading arguments followed by `extra`,
    /// blocking until it exits.
    ///
    /// Returns `Ok(None)` on a successful exit and the captured output on an
    /// unsuccessful one. Failing to start the program at all is an
    /// [`ErrorKind::Launch`][crate::ErrorKind::Launch] error.
    pub fn run<I, S>(&self, extra: I) -> Result<Option<ProcessFailure>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        log::debug!("running {self}");
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .output()
            .map_err(|e| Error::launch(self.program.to_string_lossy(), e))?;

        if output.status.success() {
            return Ok(None);
        }

        let failure = ProcessFailure {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        log::debug!(
            "{} exited unsuccessfully: {:?}",
            self.program.to_string_lossy(),
            failure.status
        );
        Ok(Some(failure))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// A cross-implementation parser that runs as external processes.
///
/// Each document goes through two steps:
///
/// 1. The document is written to `<scratch>/in` and the *compiler* is run as
///    `compiler... <scratch>/in <scratch>/out`. A non-zero exit is an
///    [`ErrorKind::CompileFailed`][crate::ErrorKind::CompileFailed] rejection.
///
/// 2. If a *build* step is configured, it is run over every emitted source
///    file under `<scratch>/out/<namespace dir>`. A non-zero exit is an
///    [`ErrorKind::BuildFailed`][crate::ErrorKind::BuildFailed] rejection.
///
/// Both steps block until the process exits. There is no timeout, so a hung
/// compiler stalls the run.
///
/// # Example
///
/// ```no_run
/// use favro::adapters::{ExternalCompiler, Invocation, ParserAdapter};
///
/// let mut compiler = ExternalCompiler::new(Invocation::new("my-avro-compiler"), "/tmp/favro")
///     .build(Invocation::new("cc").arg("-c"))
///     .extension("c");
///
/// compiler.parse(r#"{"protocol": "P", "messages": {}}"#)?;
/// # Ok::<(), favro::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct ExternalCompiler {
    compiler: Invocation,
    build: Option<Invocation>,
    scratch: PathBuf,
    namespace_dir: PathBuf,
    extension: String,
}

impl ExternalCompiler {
    /// Create an adapter that runs `compiler` in the `scratch` directory,
    /// without a build step.
    pub fn new(compiler: Invocation, scratch: impl Into<PathBuf>) -> Self {
        ExternalCompiler {
            compiler,
            build: None,
            scratch: scratch.into(),
            namespace_dir: PathBuf::from(crate::schema::NAMESPACE),
            extension: "java".to_string(),
        }
    }

    /// The Apache Avro Java implementation: `SpecificCompiler` followed by
    /// `javac`, both on a classpath made of `<avro_build>/classes` and every
    /// jar in `<avro_build>/lib`.
    pub fn avro_java(avro_build: &Path, scratch: impl Into<PathBuf>) -> Result<Self> {
        let lib = avro_build.join("lib");
        let mut jars = Vec::new();
        for entry in fs::read_dir(&lib).map_err(|e| Error::io(&lib, e))? {
            let path = entry.map_err(|e| Error::io(&lib, e))?.path();
            if path.extension() == Some(OsStr::new("jar")) {
                jars.push(path);
            }
        }
        jars.sort();

        let entries = std::iter::once(avro_build.join("classes")).chain(jars);
        let classpath = std::env::join_paths(entries)
            .map_err(|e| Error::io(&lib, io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        log::debug!("avro classpath: {}", classpath.to_string_lossy());

        let compiler = Invocation::new("java")
            .arg("-cp")
            .arg(classpath.clone())
            .arg("org.apache.avro.specific.SpecificCompiler");
        let build = Invocation::new("javac").arg("-cp").arg(classpath);

        Ok(ExternalCompiler::new(compiler, scratch).build(build))
    }

    /// Build the emitted sources with `build` after a successful compile.
    pub fn build(mut self, build: Invocation) -> Self {
        self.build = Some(build);
        self
    }

    /// Set the subdirectory of the output directory that sources are emitted
    /// into. Defaults to `favro`.
    pub fn namespace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.namespace_dir = dir.into();
        self
    }

    /// Set the file extension of emitted sources. Defaults to `java`.
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into();
        self
    }

    /// Where documents are written before compiling.
    pub fn input_path(&self) -> PathBuf {
        self.scratch.join("in")
    }

    /// Where the compiler is told to emit sources.
    pub fn output_dir(&self) -> PathBuf {
        self.scratch.join("out")
    }

    fn prepare(&self, text: &str) -> Result<()> {
        fs::create_dir_all(&self.scratch).map_err(|e| Error::io(&self.scratch, e))?;

        let input = self.input_path();
        fs::write(&input, text).map_err(|e| Error::io(&input, e))?;

        let output = self.output_dir();
        match fs::remove_dir_all(&output) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(Error::io(&output, e)),
            _ => Ok(()),
        }
    }

    /// The emitted sources, sorted by path.
    fn sources(&self) -> Result<Vec<PathBuf>> {
        let dir = self.output_dir().join(&self.namespace_dir);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&dir, e)),
        };

        let mut sources = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&dir, e))?.path();
            if path.extension() == Some(OsStr::new(&self.extension)) {
                sources.push(path);
            }
        }
        sources.sort();
        Ok(sources)
    }
}

impl ParserAdapter for ExternalCompiler {
    fn name(&self) -> &str {
        "external"
    }

    fn parse(&mut self, text: &str) -> Result<()> {
        self.prepare(text)?;

        let input = self.input_path();
        let output = self.output_dir();
        if let Some(failure) = self.compiler.run([input.as_os_str(), output.as_os_str()])? {
            return Err(Error::compile_failed(failure));
        }

        let Some(build) = &self.build else {
            return Ok(());
        };

        let sources = self.sources()?;
        if sources.is_empty() {
            log::debug!("no .{} sources emitted, skipping the build step", self.extension);
            return Ok(());
        }

        if let Some(failure) = build.run(&sources)? {
            return Err(Error::build_failed(failure));
        }
        Ok(())
    }
}
