//! Disposable execution contexts for untrusted candidate code.
//!
//! Each job gets a fresh `python3` subprocess in isolated mode with an
//! empty environment and a scratch working directory. A generated driver
//! script embeds the candidate source, the oracle, and the entry-point
//! name; it installs resource ceilings and a reliability guard before any
//! candidate code runs, then reports a single verdict through a file the
//! candidate's own stdout/stderr can never corrupt.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

/// File name of the staged driver script inside the scratch directory.
pub const DRIVER_FILE_NAME: &str = "job.py";

/// File name of the verdict file the driver writes before exiting.
pub const VERDICT_FILE_NAME: &str = "verdict.json";

/// Driver body appended after the generated assignment header.
///
/// Control flow mirrors the outcome taxonomy: compile failures are load
/// errors, `MemoryError` is a resource-limit breach, `AssertionError`
/// from the oracle is an assertion failure, anything else uncaught is a
/// runtime error. Oracle-side breakdowns report `harness_fault`; they
/// are the benchmark's fault, not the candidate's.
const DRIVER_BODY: &str = r#"
_VERDICT_PATH = os.path.abspath("verdict.json")


def _report(outcome, detail=""):
    with open(_VERDICT_PATH, "w") as handle:
        json.dump({"outcome": outcome, "detail": detail[:4096]}, handle)


def _install_guard():
    try:
        import resource
    except ImportError:
        resource = None
    if resource is not None and _MEMORY_LIMIT_BYTES > 0:
        for _name in ("RLIMIT_AS", "RLIMIT_DATA"):
            _limit = getattr(resource, _name, None)
            if _limit is None:
                continue
            try:
                resource.setrlimit(_limit, (_MEMORY_LIMIT_BYTES, _MEMORY_LIMIT_BYTES))
            except (ValueError, OSError):
                pass
    import builtins
    builtins.exit = None
    builtins.quit = None
    for _name in (
        "system", "popen", "execl", "execle", "execlp", "execlpe", "execv",
        "execve", "execvp", "execvpe", "fork", "forkpty", "kill", "killpg",
        "setuid", "setgid", "putenv",
    ):
        if hasattr(os, _name):
            setattr(os, _name, None)
    for _name in ("subprocess", "socket", "ctypes"):
        sys.modules[_name] = None


def _run():
    _install_guard()

    try:
        candidate_code = compile(_CANDIDATE_SOURCE, "<candidate>", "exec")
    except (SyntaxError, ValueError, OverflowError) as exc:
        _report("load_error", "%s: %s" % (type(exc).__name__, exc))
        return

    namespace = {"__name__": "__candidate__"}
    try:
        exec(candidate_code, namespace)
    except MemoryError:
        _report("resource_limit_exceeded", "MemoryError while loading candidate")
        return
    except BaseException:
        _report("runtime_error", traceback.format_exc(limit=8))
        return

    entry = namespace.get(_ENTRY_POINT)
    if not callable(entry):
        _report("load_error", "entry point %r is absent or not callable" % _ENTRY_POINT)
        return

    oracle_namespace = {"__name__": "__oracle__"}
    try:
        exec(compile(_ORACLE_SOURCE, "<oracle>", "exec"), oracle_namespace)
    except BaseException:
        _report("harness_fault", "oracle failed to load:\n" + traceback.format_exc(limit=8))
        return

    check = oracle_namespace.get("check")
    if not callable(check):
        _report("harness_fault", "oracle exposes no callable check routine")
        return

    try:
        check(entry)
    except AssertionError as exc:
        detail = str(exc)
        for frame in reversed(traceback.extract_tb(sys.exc_info()[2])):
            if frame.filename == "<oracle>":
                location = "oracle line %d" % frame.lineno
                detail = location if not detail else "%s: %s" % (location, detail)
                break
        _report("assertion_failure", detail or "oracle assertion failed")
    except MemoryError:
        _report("resource_limit_exceeded", "MemoryError during verification")
    except BaseException:
        _report("runtime_error", traceback.format_exc(limit=8))
    else:
        _report("pass")


_run()
"#;

/// Render the complete driver script for one job.
///
/// The assignment header is built by concatenation, never by substituting
/// markers into the body, so candidate text containing driver-like strings
/// cannot alter the script structure.
pub fn render_driver(
    candidate_source: &str,
    oracle_code: &str,
    entry_point: &str,
    memory_limit_bytes: u64,
) -> String {
    let mut script = String::with_capacity(
        DRIVER_BODY.len() + candidate_source.len() + oracle_code.len() + 256,
    );
    script.push_str("import json\nimport os\nimport sys\nimport traceback\n\n");
    script.push_str(&format!("_MEMORY_LIMIT_BYTES = {}\n", memory_limit_bytes));
    script.push_str(&format!(
        "_CANDIDATE_SOURCE = {}\n",
        py_string_literal(candidate_source)
    ));
    script.push_str(&format!(
        "_ORACLE_SOURCE = {}\n",
        py_string_literal(oracle_code)
    ));
    script.push_str(&format!("_ENTRY_POINT = {}\n", py_string_literal(entry_point)));
    script.push_str(DRIVER_BODY);
    script
}

/// Escape arbitrary text as a double-quoted Python string literal.
fn py_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Build the sandbox command: isolated interpreter, empty environment,
/// null stdin, piped output, scratch working directory, own process
/// group, SIGKILL on drop.
pub fn sandbox_command(interpreter: &str, scratch_dir: &Path) -> Command {
    let mut cmd = Command::new(interpreter);
    cmd.arg("-I") // isolated mode: no user site, no cwd on sys.path
        .arg("-E") // ignore PYTHON* environment variables
        .arg("-S") // skip the site module
        .arg("-u") // unbuffered output
        .arg(DRIVER_FILE_NAME)
        .current_dir(scratch_dir)
        .env_clear()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);
    cmd
}
