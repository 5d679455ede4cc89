//! 外部コマンドの実行
//!
//! `docker` CLI の呼び出しはすべて [`CommandRunner`] を経由します。
//! 実行前にコマンドラインを表示し、子プロセスの標準出力を1行ずつ
//! そのまま中継します。

use crate::error::{BuildError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::process::{ExitStatus, Stdio};
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// 外部コマンドを実行して終了コードを返す
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<i32>;
}

/// `program arg1 arg2 ...`
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 行単位の出力先。書き込みごとに flush する。
struct LineSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> LineSink<W> {
    fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn emit(&self, line: &str) -> Result<()> {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }

    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

/// 子プロセスを起動する実装
pub struct ProcessRunner<W = std::io::Stdout> {
    sink: LineSink<W>,
}

impl ProcessRunner<std::io::Stdout> {
    /// 自プロセスの標準出力へ中継する
    pub fn stdout() -> Self {
        Self::with_writer(std::io::stdout())
    }
}

impl<W: Write + Send> ProcessRunner<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            sink: LineSink::new(out),
        }
    }

    /// 書き込まれた出力を取り出す
    pub fn into_writer(self) -> W {
        self.sink.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> CommandRunner for ProcessRunner<W> {
    async fn run(&self, program: &str, args: &[String]) -> Result<i32> {
        let line = command_line(program, args);
        self.sink.emit(&line)?;
        tracing::debug!("Running: {}", line);

        // stderr は継承する（取り込まない）
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| BuildError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf).await? == 0 {
                    break;
                }
                let text = String::from_utf8_lossy(&buf);
                self.sink.emit(text.trim_end())?;
            }
        }

        let status = child.wait().await?;
        let code = exit_code(status);
        tracing::debug!("`{}` exited with {}", program, code);
        Ok(code)
    }
}

/// シグナルで終了した場合はシグナル番号を負にして返す
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

/// コマンドラインを表示するだけで何も実行しない
pub struct DryRunRunner<W = std::io::Stdout> {
    sink: LineSink<W>,
}

impl DryRunRunner<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::with_writer(std::io::stdout())
    }
}

impl<W: Write + Send> DryRunRunner<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            sink: LineSink::new(out),
        }
    }

    pub fn into_writer(self) -> W {
        self.sink.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> CommandRunner for DryRunRunner<W> {
    async fn run(&self, program: &str, args: &[String]) -> Result<i32> {
        let line = command_line(program, args);
        self.sink.emit(&line)?;
        tracing::debug!("Dry run: {}", line);
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_line() {
        let line = command_line("docker", &args(&["image", "prune", "-f"]));
        assert_eq!(line, "docker image prune -f");
        assert_eq!(command_line("docker", &[]), "docker");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_and_streamed_output() {
        let runner = ProcessRunner::with_writer(Vec::new());
        let script = args(&["-c", "echo first; echo 'second   '; printf third; exit 7"]);

        let code = runner.run("sh", &script).await.unwrap();
        assert_eq!(code, 7);

        let output = String::from_utf8(runner.into_writer()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "sh -c echo first; echo 'second   '; printf third; exit 7",
                "first",
                "second",
                "third",
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_exit_code() {
        let runner = ProcessRunner::with_writer(Vec::new());
        let code = runner.run("true", &[]).await.unwrap();
        assert_eq!(code, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_exit_code() {
        let runner = ProcessRunner::with_writer(Vec::new());
        let code = runner
            .run("sh", &args(&["-c", "kill -9 $$"]))
            .await
            .unwrap();
        assert_eq!(code, -9);
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let runner = ProcessRunner::with_writer(Vec::new());
        let result = runner.run("imgforge-no-such-program", &[]).await;

        match result {
            Err(BuildError::Spawn { program, .. }) => {
                assert_eq!(program, "imgforge-no-such-program");
            }
            other => panic!("Expected Spawn error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_dry_run_echoes_only() {
        let runner = DryRunRunner::with_writer(Vec::new());
        let code = runner
            .run("docker", &args(&["image", "tag", "a:1", "a:latest"]))
            .await
            .unwrap();
        assert_eq!(code, 0);

        let output = String::from_utf8(runner.into_writer()).unwrap();
        assert_eq!(output, "docker image tag a:1 a:latest\n");
    }
}
