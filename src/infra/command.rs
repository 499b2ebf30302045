//! # Process Executor Module / 进程执行模块
//!
//! Runs the assembled MSTest command and streams its console output into the
//! build log as it is produced.
//!
//! 运行组装好的 MSTest 命令，并在输出产生时将其控制台输出流式写入构建日志。

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::models::{CommandInvocation, ExecutionError};
use crate::infra::log::LogSink;
use crate::infra::t;

/// Runs `invocation` to completion and returns its exit code.
///
/// Stdout and stderr are read line by line on their own tasks and forwarded to
/// `sink` in arrival order. If `cancel` fires first, the child is killed and
/// [`ExecutionError::Cancelled`] is returned.
///
/// 运行 `invocation` 直到结束并返回其退出码。
///
/// stdout 和 stderr 分别在各自的任务中逐行读取，并按到达顺序转发到 `sink`。
/// 如果 `cancel` 先被触发，子进程会被终止并返回 [`ExecutionError::Cancelled`]。
pub async fn run(
    invocation: &CommandInvocation,
    sink: Arc<dyn LogSink>,
    cancel: &CancellationToken,
) -> Result<i32, ExecutionError> {
    let mut cmd = Command::new(invocation.program());
    cmd.args(invocation.args())
        .envs(&invocation.env)
        .current_dir(&invocation.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ExecutionError::Launch {
        program: invocation.program().to_string(),
        source,
    })?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, tx.clone());
    }
    // The channel closes once both readers hit EOF.
    drop(tx);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                terminate(&mut child, sink.as_ref()).await;
                return Err(ExecutionError::Cancelled);
            }
            line = rx.recv() => match line {
                Some(line) => sink.output(&line),
                None => break,
            },
        }
    }

    let status = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            terminate(&mut child, sink.as_ref()).await;
            return Err(ExecutionError::Cancelled);
        }
        status = child.wait() => status.map_err(ExecutionError::Wait)?,
    };

    status.code().ok_or(ExecutionError::Terminated)
}

/// Forwards each line of `reader`. Bytes that are not valid UTF-8 (MSTest
/// writes in the console code page) are replaced, never dropped, and the pipe
/// is drained to EOF so the child never blocks or sees a broken pipe.
fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    // A closed receiver only means nobody is listening; keep draining.
                    let _ = tx.send(line.trim_end_matches(['\r', '\n']).to_string());
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    });
}

async fn terminate(child: &mut Child, sink: &dyn LogSink) {
    if let Err(e) = child.kill().await {
        sink.warn(&t!("run.kill_failed", error = e));
    }
}
