use errand::core::Pid;
use errand::core::Task;
use errand::core::Term;
use errand::effects::Cmd;
use errand::effects::Sub;
use errand::effects::TaskManager;
use errand::erts::Process;
use errand::erts::Runtime;
use errand::erts::RuntimeConfig;
use errand::init;
use errand::program::Application;
use errand::program::Program;
use errand::program::ProgramBuilder;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tokio::time;
use tokio::time::Instant;

async fn wait_until<F>(mut done: F)
where
  F: FnMut() -> bool,
{
  while !done() {
    time::sleep(Duration::from_millis(1)).await;
  }
}

#[test]
fn sleep_runs_on_tokio_timers() {
  let elapsed: Duration = init::block_on(RuntimeConfig::new(), |runtime: Runtime| async move {
    time::pause();

    let start: Instant = Instant::now();
    let woke: Rc<Cell<bool>> = Rc::default();
    let flag: Rc<Cell<bool>> = Rc::clone(&woke);

    runtime.raw_spawn(Process::sleep(Duration::from_secs(30)).and_then(move |_: Term| {
      flag.set(true);
      Task::succeed(())
    }));

    wait_until(|| woke.get()).await;

    start.elapsed()
  })
  .unwrap();

  assert!(elapsed >= Duration::from_secs(30));
}

#[test]
fn killed_sleeper_never_wakes() {
  init::block_on(RuntimeConfig::new(), |runtime: Runtime| async move {
    time::pause();

    let woke: Rc<Cell<bool>> = Rc::default();
    let flag: Rc<Cell<bool>> = Rc::clone(&woke);

    let pid: Pid = runtime.raw_spawn(Process::sleep(Duration::from_secs(5)).and_then(move |_: Term| {
      flag.set(true);
      Task::succeed(())
    }));

    time::sleep(Duration::from_secs(1)).await;
    runtime.kill(pid);
    time::sleep(Duration::from_secs(10)).await;

    assert!(!woke.get());
    assert!(!runtime.alive(pid));
  })
  .unwrap();
}

struct Delayed;

impl Application for Delayed {
  type Model = Vec<u32>;
  type Msg = u32;

  fn init(&self) -> (Vec<u32>, Cmd<u32>) {
    let later: Task = Process::sleep(Duration::from_millis(50)).map(|_: Term| Term::new(2_u32));

    let cmd: Cmd<u32> = Cmd::batch([
      TaskManager::perform(later, |value: Term| value.coerce::<u32>()),
      TaskManager::perform(Task::succeed(1_u32), |value: Term| value.coerce::<u32>()),
    ]);

    (Vec::new(), cmd)
  }

  fn update(&self, msg: u32, mut model: Vec<u32>) -> (Vec<u32>, Cmd<u32>) {
    model.push(msg);
    (model, Cmd::none())
  }

  fn subscriptions(&self, _model: &Vec<u32>) -> Sub<u32> {
    Sub::none()
  }
}

#[test]
fn program_runs_under_block_on() {
  let model: Vec<u32> = init::block_on(RuntimeConfig::new(), |runtime: Runtime| async move {
    time::pause();

    let program: Program<Delayed> = ProgramBuilder::new(Delayed)
      .with_task_manager()
      .unwrap()
      .start(&runtime, |_: &Vec<u32>| {});

    wait_until(|| program.updates() == 2).await;

    program.with_model(Clone::clone)
  })
  .unwrap();

  assert_eq!(model, [1, 2]);
}
