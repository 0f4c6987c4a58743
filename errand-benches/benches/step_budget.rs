use criterion::BenchmarkGroup;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use errand::core::Pid;
use errand::core::Task;
use errand::core::Term;
use errand::erts::ManualHost;
use errand::erts::Runtime;
use errand::erts::RuntimeConfig;
use std::hint::black_box;
use std::num::NonZeroU32;

const BUDGETS: &[u32] = &[100, 1_000, 10_000];
const PROCESSES: u32 = 16;
const ITERATIONS: u32 = 1_000;

fn countdown(remaining: u32) -> Task {
  if remaining == 0 {
    return Task::succeed(());
  }

  Task::succeed(remaining).and_then(move |value: Term| countdown(value.coerce::<u32>() - 1))
}

fn bench_step_budget(criterion: &mut Criterion) {
  let mut group: BenchmarkGroup<_> = criterion.benchmark_group("step_budget");

  for budget in BUDGETS {
    let id: BenchmarkId = BenchmarkId::new("countdown", budget);

    group.bench_with_input(id, budget, |bench, &budget| {
      bench.iter(|| {
        let host: ManualHost = ManualHost::new();
        let config: RuntimeConfig = RuntimeConfig::new().with_step_budget(NonZeroU32::new(budget).unwrap());
        let runtime: Runtime = Runtime::new(config, host.clone());

        for _ in 0..PROCESSES {
          runtime.raw_spawn(countdown(ITERATIONS));
        }

        black_box(host.run_until_idle());
      })
    });
  }

  group.finish();
}

fn bench_mailbox(criterion: &mut Criterion) {
  criterion.bench_function("mailbox_roundtrip", |bench| {
    bench.iter(|| {
      let host: ManualHost = ManualHost::new();
      let runtime: Runtime = Runtime::new(RuntimeConfig::new(), host.clone());

      fn echo(left: u32) -> Task {
        Task::receive(move |_: Term| if left == 0 { Task::succeed(()) } else { echo(left - 1) })
      }

      let pid: Pid = runtime.raw_spawn(echo(ITERATIONS));

      for index in 0..=ITERATIONS {
        runtime.raw_send(pid, Term::new(index));
      }

      black_box(host.run_until_idle());
    })
  });
}

criterion_group!(benches, bench_step_budget, bench_mailbox);
criterion_main!(benches);
