use criterion::{criterion_group, criterion_main, Criterion};
use refterm::rc::{Ctx, Expr, KVarStore, Scope, Sort, Ty, TypeFoldable, Wf};
use refterm::Error;

/// `x0 + (x1 + (... + xn))`
fn sum(cx: &mut Ctx, n: u32) -> Expr {
    let zero = cx.int(0);
    (0..n).fold(zero, |acc, i| {
        let x = cx.fvar(refterm::Name::new(i));
        cx.add(x, acc)
    })
}

fn scope() -> Result<Scope, Error> {
    let mut scope = Scope::new();
    scope.declare("n", Sort::Int)?;
    scope.declare("p", Sort::Bool)?;
    Ok(scope)
}

const TY: &str = "&mut {v: int. {Vec<{w: int. {i32[w] | w > v}}>[v] | v >= n}}";
const SIG: &str = "(|x: int, y: int| (x + y) * 2 > x)(n + 1, 3 * 4) && !!p";

fn parse_ty(cx: &mut Ctx) -> Ty {
    let mut scope = scope().unwrap();
    scope.declare_adt(cx, "Vec", Sort::Int).unwrap();
    scope.ty(cx, TY).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("intern", |b| {
        b.iter(|| {
            let mut cx = Ctx::new();
            for _ in 0..10 {
                sum(&mut cx, 100);
            }
            cx.stats()
        })
    });

    let mut cx = Ctx::new();
    let e = sum(&mut cx, 100);
    let ty = parse_ty(&mut cx);
    c.bench_function("shift", |b| {
        b.iter(|| ty.shift_in_escaping(&mut cx, 1).shift_out_escaping(&mut cx, 1))
    });

    let scope = scope().unwrap();
    let body = scope.expr(&mut cx, "|x: int| x * x + n").unwrap();
    c.bench_function("normalize", |b| {
        b.iter(|| {
            let app = cx.app(body.clone(), [e.clone()]);
            app.normalize(&mut cx)
        })
    });

    let pred = scope.expr(&mut cx, SIG).unwrap();
    c.bench_function("normalize_constants", |b| b.iter(|| pred.normalize(&mut cx)));

    c.bench_function("scope", |b| {
        b.iter(|| {
            let mut cx = Ctx::new();
            parse_ty(&mut cx)
        })
    });

    c.bench_function("kvars", |b| {
        b.iter(|| {
            let mut kvars = KVarStore::new();
            let ty = ty.with_holes(&mut cx);
            let ty = ty.replace_holes(&mut cx, |cx, scope| kvars.fresh(cx, scope));
            Wf::new(scope.sort_env())
                .with_kvars(&kvars)
                .check_ty(&mut cx, &ty)
                .unwrap()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
