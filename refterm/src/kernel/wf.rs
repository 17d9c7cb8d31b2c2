//! Sort checking of expressions and well-formedness of types.

use super::{BaseTy, Ctx, Expr, ExprKind, FnSig, KVarStore, List, PolyFnSig, Sort, Ty, TyKind};
use crate::error::WfError as Error;
use crate::{BinOp, Constant, Name, Stack, UnOp};
use alloc::{string::ToString, vec::Vec};
use fnv::FnvHashMap;

/// Sorts of free variables.
#[derive(Clone, Debug, Default)]
pub struct SortEnv {
    names: FnvHashMap<Name, Sort>,
}

impl SortEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Name, sort: Sort) -> Option<Sort> {
        self.names.insert(name, sort)
    }

    pub fn get(&self, name: &Name) -> Option<&Sort> {
        self.names.get(name)
    }
}

/// Sorts of bound variables, innermost binder first.
type Bound = Stack<List<Sort>>;

/// Sort checker.
///
/// ~~~
/// # use refterm::rc::{Ctx, Scope, Sort, Wf};
/// # use refterm::error::WfError;
/// let mut cx = Ctx::new();
/// let mut scope = Scope::new();
/// scope.declare("xs", Sort::Int)?;
///
/// let wf = Wf::new(scope.sort_env());
/// let f = scope.expr(&mut cx, "|x: int, b: bool| if b { x } else { xs }")?;
/// assert_eq!(wf.synth_expr(&mut cx, &f)?.to_string(), "fn(int, bool) -> int");
///
/// let e = scope.expr(&mut cx, "xs > 0 && xs")?;
/// let err = WfError::SortMismatch { expected: "bool".into(), found: "int".into() };
/// assert_eq!(wf.check_expr(&mut cx, &e, &Sort::Bool), Err(err));
/// # Ok::<_, refterm::Error>(())
/// ~~~
pub struct Wf<'a> {
    env: &'a SortEnv,
    kvars: Option<&'a KVarStore>,
}

fn mismatch(expected: &Sort, found: &Sort) -> Error {
    Error::SortMismatch {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

impl<'a> Wf<'a> {
    /// Create a checker that rejects all kvars.
    pub fn new(env: &'a SortEnv) -> Self {
        Self { env, kvars: None }
    }

    /// Accept the kvars of the given store.
    pub fn with_kvars(self, kvars: &'a KVarStore) -> Self {
        let kvars = Some(kvars);
        Self { kvars, ..self }
    }

    /// Return the sort of a closed expression.
    pub fn synth_expr(&self, cx: &mut Ctx, e: &Expr) -> Result<Sort, Error> {
        self.synth(cx, e, &mut Stack::new())
    }

    /// Verify that a closed expression has the given sort.
    pub fn check_expr(&self, cx: &mut Ctx, e: &Expr, sort: &Sort) -> Result<(), Error> {
        self.check(cx, e, sort, &mut Stack::new())
    }

    /// Verify that the indices and refinements of a closed type are well-sorted.
    pub fn check_ty(&self, cx: &mut Ctx, ty: &Ty) -> Result<(), Error> {
        debug!("check well-formedness of {}", ty);
        self.ty(cx, ty, &mut Stack::new())
    }

    /// Verify that a function signature is well-formed
    /// under its refinement parameters.
    pub fn check_fn_sig(&self, cx: &mut Ctx, sig: &PolyFnSig) -> Result<(), Error> {
        debug!("check well-formedness of {}", sig.value());
        let mut bnd = Stack::new();
        bnd.with_pushed(sig.vars().clone(), |bnd| {
            let FnSig {
                requires,
                inputs,
                output,
                ensures,
            } = sig.value();
            let mut preds = requires.iter().chain(ensures.iter());
            preds.try_for_each(|p| self.check(cx, p, &Sort::Bool, bnd))?;
            inputs.iter().try_for_each(|ty| self.ty(cx, ty, bnd))?;
            self.ty(cx, output, bnd)
        })
    }

    fn check(&self, cx: &mut Ctx, e: &Expr, sort: &Sort, bnd: &mut Bound) -> Result<(), Error> {
        trace!("check {} : {}", e, sort);
        if e.is_hole() {
            return Ok(());
        }
        let found = self.synth(cx, e, bnd)?;
        if found == *sort {
            Ok(())
        } else {
            Err(mismatch(sort, &found))
        }
    }

    /// Synthesise the sort of one of two expressions that must have the same sort,
    /// then check the other expression against it.
    fn same(&self, cx: &mut Ctx, e1: &Expr, e2: &Expr, bnd: &mut Bound) -> Result<Sort, Error> {
        let (e1, e2) = if e1.is_hole() { (e2, e1) } else { (e1, e2) };
        let sort = self.synth(cx, e1, bnd)?;
        self.check(cx, e2, &sort, bnd)?;
        Ok(sort)
    }

    fn synth(&self, cx: &mut Ctx, e: &Expr, bnd: &mut Bound) -> Result<Sort, Error> {
        trace!("synthesise sort of {}", e);
        match e.kind() {
            ExprKind::FreeVar(x) => self.env.get(x).cloned().ok_or(Error::UnboundName(*x)),
            ExprKind::BoundVar(v) => {
                let vars = bnd.get(v.debruijn.as_u32() as usize);
                let sort = vars.and_then(|vars| vars.get(v.index as usize));
                sort.cloned().ok_or(Error::UnboundVar(*v))
            }
            ExprKind::EVar(evar) => Err(Error::UnsolvedEVar(*evar)),
            ExprKind::Constant(Constant::Int(_)) => Ok(Sort::Int),
            ExprKind::Constant(Constant::Bool(_)) => Ok(Sort::Bool),
            ExprKind::BinaryOp(op, e1, e2) => {
                use BinOp::*;
                let (arg, result) = match op {
                    Add | Sub | Mul | Div | Mod => (Sort::Int, Sort::Int),
                    Lt | Le | Gt | Ge => (Sort::Int, Sort::Bool),
                    And | Or | Imp | Iff => (Sort::Bool, Sort::Bool),
                    Eq | Ne => {
                        self.same(cx, e1, e2, bnd)?;
                        return Ok(Sort::Bool);
                    }
                };
                self.check(cx, e1, &arg, bnd)?;
                self.check(cx, e2, &arg, bnd)?;
                Ok(result)
            }
            ExprKind::UnaryOp(op, e) => {
                let sort = match op {
                    UnOp::Not => Sort::Bool,
                    UnOp::Neg => Sort::Int,
                };
                self.check(cx, e, &sort, bnd)?;
                Ok(sort)
            }
            ExprKind::Tuple(es) => {
                let sorts = es.iter().map(|e| self.synth(cx, e, bnd));
                let sorts = sorts.collect::<Result<Vec<_>, _>>()?;
                Ok(cx.tuple_sort(sorts))
            }
            ExprKind::TupleProj(e, index) => {
                let sort = self.synth(cx, e, bnd)?;
                let sorts = sort.as_tuple();
                let sorts = sorts.ok_or_else(|| Error::ExpectedTuple(sort.to_string()))?;
                let len = sorts.len();
                let proj = sorts.get(*index as usize).cloned();
                proj.ok_or(Error::ProjOutOfRange { index: *index, len })
            }
            ExprKind::IfThenElse(c, e1, e2) => {
                self.check(cx, c, &Sort::Bool, bnd)?;
                self.same(cx, e1, e2, bnd)
            }
            ExprKind::KVar(kvar) => {
                let decl = self.kvars.and_then(|kvars| kvars.get(kvar.kvid));
                let decl = decl.ok_or(Error::UnknownKVar(kvar.kvid))?;
                self.args(cx, &kvar.args, decl, bnd)?;
                Ok(Sort::Bool)
            }
            ExprKind::Abs(body) => {
                let vars = body.vars().clone();
                let body = body.value();
                let output = bnd.with_pushed(vars.clone(), |bnd| self.synth(cx, body, bnd))?;
                Ok(cx.func_sort(vars.iter().cloned(), output))
            }
            ExprKind::App(func, args) => {
                let sort = self.synth(cx, func, bnd)?;
                let func = sort.as_func();
                let (inputs, output) = func.ok_or_else(|| Error::ExpectedFunc(sort.to_string()))?;
                self.args(cx, args, inputs, bnd)?;
                Ok(output.clone())
            }
            ExprKind::Hole => Err(Error::UninferableHole),
        }
    }

    fn args(&self, cx: &mut Ctx, args: &[Expr], sorts: &[Sort], bnd: &mut Bound) -> Result<(), Error> {
        if args.len() != sorts.len() {
            return Err(Error::ArityMismatch {
                expected: sorts.len(),
                found: args.len(),
            });
        }
        let mut args = args.iter().zip(sorts);
        args.try_for_each(|(arg, sort)| self.check(cx, arg, sort, bnd))
    }

    fn ty(&self, cx: &mut Ctx, ty: &Ty, bnd: &mut Bound) -> Result<(), Error> {
        match ty.kind() {
            TyKind::Indexed(bty, idx) => {
                self.bty(cx, bty, bnd)?;
                self.check(cx, idx, &bty.sort(), bnd)
            }
            TyKind::Exists(b) => {
                let body = b.value();
                bnd.with_pushed(b.vars().clone(), |bnd| self.ty(cx, body, bnd))
            }
            TyKind::Constr(pred, ty) => {
                self.check(cx, pred, &Sort::Bool, bnd)?;
                self.ty(cx, ty, bnd)
            }
            TyKind::Tuple(tys) => tys.iter().try_for_each(|ty| self.ty(cx, ty, bnd)),
            TyKind::Ref(_, ty) => self.ty(cx, ty, bnd),
            TyKind::Param(_) | TyKind::Uninit | TyKind::Never => Ok(()),
        }
    }

    fn bty(&self, cx: &mut Ctx, bty: &BaseTy, bnd: &mut Bound) -> Result<(), Error> {
        match bty {
            BaseTy::Adt(_, args) => args.iter().try_for_each(|ty| self.ty(cx, ty, bnd)),
            BaseTy::Int(_) | BaseTy::Uint(_) | BaseTy::Bool => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Binder, Scope, TypeFoldable};
    use super::*;
    use crate::{BoundVar, EVar, IntTy};
    use alloc::string::String;

    fn scope() -> Scope {
        let mut scope = Scope::new();
        scope.declare("n", Sort::Int).unwrap();
        scope.declare("p", Sort::Bool).unwrap();
        scope
    }

    fn synth(s: &str) -> Result<String, Error> {
        let mut cx = Ctx::new();
        let scope = scope();
        let e = scope.expr(&mut cx, s).unwrap();
        let sort = Wf::new(scope.sort_env()).synth_expr(&mut cx, &e)?;
        Ok(sort.to_string())
    }

    fn mismatch(expected: &str, found: &str) -> Error {
        Error::SortMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    #[test]
    fn expressions() {
        assert_eq!(synth("n * (n - 1) % 2"), Ok("int".into()));
        assert_eq!(synth("n >= 0 => p <=> !p"), Ok("bool".into()));
        assert_eq!(synth("(n, (p, -n)).1"), Ok("(bool, int)".into()));
        assert_eq!(synth("if p { (n,) } else { (0,) }"), Ok("(int,)".into()));
        assert_eq!(synth("(|x: int| (x, p))(n).0"), Ok("int".into()));
        assert_eq!(synth("|| n"), Ok("fn() -> int".into()));
        assert_eq!(synth("n == *"), Ok("bool".into()));
    }

    #[test]
    fn errors() {
        assert_eq!(synth("n + p"), Err(mismatch("int", "bool")));
        assert_eq!(synth("p == n"), Err(mismatch("bool", "int")));
        assert_eq!(synth("if n { n } else { n }"), Err(mismatch("bool", "int")));
        assert_eq!(synth("(n, p).2"), Err(Error::ProjOutOfRange { index: 2, len: 2 }));
        assert_eq!(synth("n.0"), Err(Error::ExpectedTuple("int".into())));
        assert_eq!(synth("p(n)"), Err(Error::ExpectedFunc("bool".into())));
        let arity = Error::ArityMismatch { expected: 1, found: 2 };
        assert_eq!(synth("(|x: int| x)(n, n)"), Err(arity));
        assert_eq!(synth("?0 + 1"), Err(Error::UnsolvedEVar(EVar::new(0))));
        assert_eq!(synth("$0(n)"), Err(Error::UnknownKVar(crate::KVid::new(0))));
        assert_eq!(synth("*"), Err(Error::UninferableHole));
    }

    #[test]
    fn unbound() {
        let mut cx = Ctx::new();
        let env = SortEnv::new();
        let wf = Wf::new(&env);
        let x = cx.fvar(Name::new(3));
        assert_eq!(wf.synth_expr(&mut cx, &x), Err(Error::UnboundName(Name::new(3))));
        let nu = cx.nu();
        assert_eq!(wf.synth_expr(&mut cx, &nu), Err(Error::UnboundVar(BoundVar::NU)));
    }

    #[test]
    fn types() {
        let mut cx = Ctx::new();
        let mut scope = scope();
        let vec = scope.declare_adt(&mut cx, "Vec", Sort::Int).unwrap();
        let wf = Wf::new(scope.sort_env());
        let mut check = |s: &str| {
            let ty = scope.ty(&mut cx, s).unwrap();
            wf.check_ty(&mut cx, &ty)
        };
        assert_eq!(check("&mut Vec<{v: int. {i32[v] | v > n}}>[n]"), Ok(()));
        assert_eq!(check("({b: bool. bool[b]}, #0, uninit, !)"), Ok(()));
        assert_eq!(check("{v: int. {i32[v] | v}}"), Err(mismatch("bool", "int")));
        assert_eq!(check("bool[n]"), Err(mismatch("bool", "int")));
        assert_eq!(check("Vec<u8[p]>[0]"), Err(mismatch("int", "bool")));
        assert_eq!(vec.name, "Vec");
    }

    #[test]
    fn kvars() {
        let mut cx = Ctx::new();
        let scope = scope();
        let mut kvars = KVarStore::new();
        let ty = scope.ty(&mut cx, "{v: int. Vec2<{i32[v] | v > n}, bool>[v]}");
        assert!(ty.is_err());

        let ty = scope.ty(&mut cx, "({v: int. {i32[v] | v > n}}, {v: (int, bool). {i32[v.0] | v.1}})");
        let ty = ty.unwrap().with_holes(&mut cx);
        let ty = ty.replace_holes(&mut cx, |cx, scope| kvars.fresh(cx, scope));
        let env = scope.sort_env();
        assert!(Wf::new(env).check_ty(&mut cx, &ty).is_err());
        assert_eq!(Wf::new(env).with_kvars(&kvars).check_ty(&mut cx, &ty), Ok(()));

        let bad = cx.kvar(crate::KVid::new(0), []);
        let arity = Error::ArityMismatch { expected: 1, found: 0 };
        let wf = Wf::new(env).with_kvars(&kvars);
        assert_eq!(wf.check_expr(&mut cx, &bad, &Sort::Bool), Err(arity));
    }

    #[test]
    fn fn_sigs() {
        let mut cx = Ctx::new();
        let env = SortEnv::new();
        let nu = cx.nu();
        let zero = cx.int(0);
        let pos = cx.gt(nu.clone(), zero);
        let input = cx.indexed(BaseTy::Int(IntTy::I32), nu);
        let output = cx.exists_base(BaseTy::Bool);
        let sig = FnSig {
            requires: cx.mk_list([pos]),
            inputs: cx.mk_list([input]),
            output,
            ensures: cx.mk_list([]),
        };
        let vars = cx.sorts([Sort::Int]);
        let sig = Binder::new(sig, vars);
        assert_eq!(Wf::new(&env).check_fn_sig(&mut cx, &sig), Ok(()));

        let vars = cx.sorts([Sort::Bool]);
        let sig = Binder::new(sig.skip_binder(), vars);
        let err = Wf::new(&env).check_fn_sig(&mut cx, &sig);
        assert_eq!(err, Err(mismatch("int", "bool")));
    }
}
