//! Worker-process pool.
//!
//! Children are started up front and fed batches of [`Job`]s over their stdin.
//! Every frame is a 4-byte little-endian length followed by a bincode payload:
//! the parent sends `Vec<Job>`, the child answers `Result<Vec<JobOutput>, String>`.

use std::env;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;

use crossbeam_channel::unbounded;
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::workload::{cpu_bound_task, file_io_task};
use crate::{BenchError, Result};

/// Set on every child so that a benchmark binary re-executed as a worker
/// knows to serve jobs instead of running the comparison.
pub const WORKER_ROLE_ENV: &str = "POOLBENCH_ROLE";
pub const WORKER_ROLE: &str = "worker";
/// Overrides where [`WorkerProgram::locate`] looks for the worker binary.
pub const WORKER_PATH_ENV: &str = "POOLBENCH_WORKER";
pub const WORKER_BIN_NAME: &str = "poolbench-worker";

/// A unit of work that can cross the process boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Job {
    CpuBound { repeat: u64 },
    FileChurn { path: PathBuf, size: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutput {
    Count(u64),
    BytesRead(u64),
}

type Reply = std::result::Result<Vec<JobOutput>, String>;

impl Job {
    pub fn execute(&self) -> Result<JobOutput> {
        match self {
            Job::CpuBound { repeat } => Ok(JobOutput::Count(cpu_bound_task(*repeat))),
            Job::FileChurn { path, size } => file_io_task(path, *size).map(JobOutput::BytesRead),
        }
    }
}

/// Executable that serves jobs on stdin/stdout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerProgram {
    path: PathBuf,
}

impl WorkerProgram {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(BenchError::WorkerNotFound(path));
        }
        Ok(Self { path })
    }

    /// Re-execute the running binary in worker role
    pub fn current_exe() -> Result<Self> {
        Self::new(env::current_exe()?)
    }

    /// `$POOLBENCH_WORKER`, or the worker binary next to the current executable
    pub fn locate() -> Result<Self> {
        if let Some(path) = env::var_os(WORKER_PATH_ENV) {
            return Self::new(path);
        }
        let exe = env::current_exe()?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Self::new(dir.join(format!("{}{}", WORKER_BIN_NAME, env::consts::EXE_SUFFIX)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// True when this process was started by a [`ProcessPool`]
pub fn is_worker_process() -> bool {
    env::var(WORKER_ROLE_ENV).map_or(false, |role| role == WORKER_ROLE)
}

fn write_frame<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    let payload = bincode::serialize(value)?;
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

/// Returns `Ok(None)` on a clean EOF before the length header
fn read_frame<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>> {
    let mut header = [0u8; 4];
    match reader.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let mut payload = vec![0u8; u32::from_le_bytes(header) as usize];
    reader.read_exact(&mut payload)?;
    Ok(Some(bincode::deserialize(&payload)?))
}

/// Child-side loop: read a batch, run it, answer, until the parent closes stdin.
///
/// The first failing job in a batch aborts the batch and is reported back.
pub fn serve<R: Read, W: Write>(reader: R, writer: W) -> Result<()> {
    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(writer);
    let pid = std::process::id();

    while let Some(batch) = read_frame::<_, Vec<Job>>(&mut reader)? {
        debug!("worker process {} got batch of {}", pid, batch.len());
        let reply: Reply = batch
            .iter()
            .map(Job::execute)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.to_string());
        match &reply {
            Ok(outputs) => debug!("worker process {} finished batch of {}", pid, outputs.len()),
            Err(message) => warn!("worker process {} batch failed: {}", pid, message),
        }
        write_frame(&mut writer, &reply)?;
    }

    debug!("worker process {} input closed, exiting", pid);
    Ok(())
}

/// [`serve`] on this process's stdin/stdout
pub fn serve_stdio() -> Result<()> {
    serve(io::stdin().lock(), io::stdout().lock())
}

struct WorkerProcess {
    id: usize,
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: BufReader<ChildStdout>,
}

impl WorkerProcess {
    fn spawn(id: usize, program: &WorkerProgram) -> Result<Self> {
        let mut child = Command::new(program.path())
            .env(WORKER_ROLE_ENV, WORKER_ROLE)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| BenchError::WorkerSpawn {
                program: program.path().to_path_buf(),
                source,
            })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                return Err(BenchError::WorkerExited(id));
            }
        };
        debug!("spawned worker process {} (pid {})", id, child.id());

        Ok(Self {
            id,
            child,
            stdin: Some(BufWriter::new(stdin)),
            stdout: BufReader::new(stdout),
        })
    }

    fn call(&mut self, batch: &[Job]) -> Result<Vec<JobOutput>> {
        let stdin = self.stdin.as_mut().ok_or(BenchError::WorkerExited(self.id))?;
        write_frame(stdin, &batch)?;
        let reply: Reply = read_frame(&mut self.stdout)?.ok_or(BenchError::WorkerExited(self.id))?;
        let outputs = reply.map_err(|message| BenchError::TaskFailed {
            worker: self.id,
            message,
        })?;
        if outputs.len() != batch.len() {
            return Err(BenchError::UnexpectedOutput(format!(
                "worker {} answered {} results for {} jobs",
                self.id,
                outputs.len(),
                batch.len()
            )));
        }
        Ok(outputs)
    }

    /// Close stdin and wait for the child to exit
    fn close(&mut self) -> Result<()> {
        drop(self.stdin.take());
        let status = self.child.wait()?;
        if !status.success() {
            warn!("worker process {} exited with {}", self.id, status);
        }
        Ok(())
    }
}

/// Fixed-size pool of worker processes
pub struct ProcessPool {
    workers: Vec<WorkerProcess>,
}

impl ProcessPool {
    /// Start `size` children running `program`
    pub fn spawn(program: &WorkerProgram, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(BenchError::InvalidPoolSize);
        }
        let workers = (0..size)
            .map(|id| WorkerProcess::spawn(id, program))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { workers })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Send `jobs` out in batches of `chunksize` and collect outputs in job order.
    ///
    /// Each child pulls the next batch as soon as it answers the previous one.
    pub fn map(&mut self, jobs: Vec<Job>, chunksize: usize) -> Result<Vec<JobOutput>> {
        let chunksize = chunksize.max(1);
        let total = jobs.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let (batch_tx, batch_rx) = unbounded::<(usize, Vec<Job>)>();
        let mut batch_count = 0;
        for (index, chunk) in jobs.chunks(chunksize).enumerate() {
            // batch_rx is still alive, so the queue cannot be disconnected here
            let _ = batch_tx.send((index, chunk.to_vec()));
            batch_count += 1;
        }
        drop(batch_tx);

        let (done_tx, done_rx) = unbounded::<(usize, Result<Vec<JobOutput>>)>();
        thread::scope(|scope| {
            for worker in self.workers.iter_mut() {
                let batch_rx = batch_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    for (index, batch) in batch_rx.iter() {
                        let reply = worker.call(&batch);
                        let failed = reply.is_err();
                        if done_tx.send((index, reply)).is_err() || failed {
                            break;
                        }
                    }
                });
            }
        });
        drop(done_tx);

        let mut slots: Vec<Option<Vec<JobOutput>>> = (0..batch_count).map(|_| None).collect();
        for (index, reply) in done_rx.iter() {
            match reply {
                Ok(outputs) => slots[index] = Some(outputs),
                Err(e) => {
                    error!("batch {} failed: {}", index, e);
                    return Err(e);
                }
            }
        }

        let mut outputs = Vec::with_capacity(total);
        for slot in slots {
            outputs.extend(slot.ok_or_else(|| {
                BenchError::UnexpectedOutput("a batch was never answered".to_string())
            })?);
        }
        Ok(outputs)
    }

    /// Close every child's stdin and wait for it
    pub fn shutdown(mut self) -> Result<()> {
        let mut first_error = None;
        for mut worker in self.workers.drain(..) {
            if let Err(e) = worker.close() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for ProcessPool {
    fn drop(&mut self) {
        for worker in self.workers.iter_mut() {
            if let Err(e) = worker.close() {
                error!("failed to stop worker process {}: {}", worker.id, e);
            }
        }
    }
}
