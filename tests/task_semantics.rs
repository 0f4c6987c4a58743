use errand::core::Task;
use errand::core::Term;
use errand::erts::ManualHost;
use errand::erts::Runtime;
use errand::erts::RuntimeConfig;
use proptest::prelude::*;
use std::cell::Cell;
use std::cell::RefCell;
use std::num::NonZeroU32;
use std::rc::Rc;

// -----------------------------------------------------------------------------
// Reference Interpreter
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Expr {
  Succeed(i64),
  Fail(i64),
  AndThen(Box<Expr>, Op),
  OnError(Box<Expr>, Op),
}

#[derive(Clone, Debug)]
enum Op {
  Succeed(i64),
  Fail(i64),
  Then(Box<Expr>),
}

fn eval(expr: &Expr) -> Result<i64, i64> {
  match expr {
    Expr::Succeed(value) => Ok(*value),
    Expr::Fail(error) => Err(*error),
    Expr::AndThen(inner, op) => match eval(inner) {
      Ok(value) => apply(op, value),
      Err(error) => Err(error),
    },
    Expr::OnError(inner, op) => match eval(inner) {
      Ok(value) => Ok(value),
      Err(error) => apply(op, error),
    },
  }
}

fn apply(op: &Op, value: i64) -> Result<i64, i64> {
  match op {
    Op::Succeed(offset) => Ok(value.wrapping_add(*offset)),
    Op::Fail(offset) => Err(value.wrapping_add(*offset)),
    Op::Then(expr) => eval(expr),
  }
}

fn to_task(expr: Expr) -> Task {
  match expr {
    Expr::Succeed(value) => Task::succeed(value),
    Expr::Fail(error) => Task::fail(error),
    Expr::AndThen(inner, op) => to_task(*inner).and_then(move |value: Term| call(op, value)),
    Expr::OnError(inner, op) => to_task(*inner).on_error(move |error: Term| call(op, error)),
  }
}

fn call(op: Op, value: Term) -> Task {
  let value: i64 = value.coerce();

  match op {
    Op::Succeed(offset) => Task::succeed(value.wrapping_add(offset)),
    Op::Fail(offset) => Task::fail(value.wrapping_add(offset)),
    Op::Then(expr) => to_task(*expr),
  }
}

fn expr() -> impl Strategy<Value = Expr> {
  let leaf = prop_oneof![
    any::<i64>().prop_map(Expr::Succeed),
    any::<i64>().prop_map(Expr::Fail),
  ];

  leaf.prop_recursive(6, 64, 2, |inner| {
    let op = prop_oneof![
      any::<i64>().prop_map(Op::Succeed),
      any::<i64>().prop_map(Op::Fail),
      inner.clone().prop_map(|expr| Op::Then(Box::new(expr))),
    ];

    prop_oneof![
      (inner.clone(), op.clone()).prop_map(|(expr, op)| Expr::AndThen(Box::new(expr), op)),
      (inner, op).prop_map(|(expr, op)| Expr::OnError(Box::new(expr), op)),
    ]
  })
}

// -----------------------------------------------------------------------------
// Harness
// -----------------------------------------------------------------------------

fn run(task: Task, budget: u32) -> Option<Result<Term, Term>> {
  let budget: NonZeroU32 = NonZeroU32::new(budget).unwrap();
  let host: ManualHost = ManualHost::new();
  let runtime: Runtime = Runtime::new(RuntimeConfig::new().with_step_budget(budget), host.clone());

  let slot: Rc<RefCell<Option<Result<Term, Term>>>> = Rc::default();
  let ok: Rc<RefCell<Option<Result<Term, Term>>>> = Rc::clone(&slot);
  let err: Rc<RefCell<Option<Result<Term, Term>>>> = Rc::clone(&slot);

  runtime.raw_spawn(
    task
      .and_then(move |value: Term| {
        *ok.borrow_mut() = Some(Ok(value));
        Task::succeed(())
      })
      .on_error(move |error: Term| {
        *err.borrow_mut() = Some(Err(error));
        Task::succeed(())
      }),
  );

  host.run_until_idle();

  assert!(runtime.processes().is_empty());

  slot.borrow_mut().take()
}

fn run_i64(task: Task, budget: u32) -> Result<i64, i64> {
  match run(task, budget).expect("task did not complete") {
    Ok(value) => Ok(value.coerce()),
    Err(error) => Err(error.coerce()),
  }
}

// -----------------------------------------------------------------------------
// Properties
// -----------------------------------------------------------------------------

proptest! {
  #[test]
  fn stepping_matches_reference_interpreter(expr in expr(), budget in 1_u32..64) {
    let expected: Result<i64, i64> = eval(&expr);
    let actual: Result<i64, i64> = run_i64(to_task(expr), budget);

    prop_assert_eq!(actual, expected);
  }

  #[test]
  fn fail_skips_and_then_and_reaches_on_error(error in any::<i64>(), offset in any::<i64>()) {
    let called: Rc<Cell<bool>> = Rc::default();
    let flag: Rc<Cell<bool>> = Rc::clone(&called);

    let task: Task = Task::fail(error)
      .and_then(move |_: Term| {
        flag.set(true);
        Task::succeed(0_i64)
      })
      .on_error(move |error: Term| Task::succeed(error.coerce::<i64>().wrapping_add(offset)));

    prop_assert_eq!(run_i64(task, 10_000), Ok(error.wrapping_add(offset)));
    prop_assert!(!called.get());
  }
}

// -----------------------------------------------------------------------------
// Combinators
// -----------------------------------------------------------------------------

#[test]
fn map_and_map_err_transform_values() {
  let ok: Task = Task::succeed(2_i64).map(|value: Term| Term::new(value.coerce::<i64>() * 3));
  let err: Task = Task::fail(2_i64).map_err(|error: Term| Term::new(error.coerce::<i64>() - 3));

  assert_eq!(run_i64(ok, 100), Ok(6));
  assert_eq!(run_i64(err, 100), Err(-1));
}

#[test]
fn sequence_collects_in_order() {
  let task: Task = Task::sequence((1..=4_i64).map(Task::succeed)).map(|values: Term| {
    let values: Vec<i64> = values
      .coerce::<Vec<Term>>()
      .into_iter()
      .map(Term::coerce::<i64>)
      .collect();

    Term::new(values.iter().sum::<i64>())
  });

  assert_eq!(run_i64(task, 7), Ok(10));
}

#[test]
fn sequence_stops_at_first_failure() {
  let reached: Rc<Cell<bool>> = Rc::default();
  let flag: Rc<Cell<bool>> = Rc::clone(&reached);

  let task: Task = Task::sequence([
    Task::succeed(1_i64),
    Task::fail(2_i64),
    Task::succeed(3_i64).and_then(move |value: Term| {
      flag.set(true);
      Task::Succeed(value)
    }),
  ]);

  assert_eq!(run_i64(task, 100), Err(2));
  assert!(!reached.get());
}

#[test]
fn from_result_mirrors_result() {
  assert_eq!(run_i64(Task::from_result(Ok::<i64, i64>(5)), 100), Ok(5));
  assert_eq!(run_i64(Task::from_result(Err::<i64, i64>(6)), 100), Err(6));
}
