//! Scoping of parse structures to interned terms.

use super::{AdtDef, BaseTy, Binder, Ctx, Expr, Sort, SortEnv, Ty};
use crate::error::{Error as RtError, ScopeError as Error};
use crate::{BoundVar, Constant, DebruijnIndex, IntTy, KVid, Name, NameGen};
use crate::{ParamTy, RefKind, Stack, UintTy};
use alloc::{string::String, string::ToString, vec::Vec};
use fnv::FnvHashMap;
use refterm_parse::syntax;

/// Names of bound variables, innermost binder first.
type Bound<'s> = Stack<Vec<&'s str>>;

/// Free variables and ADTs that may be referred to by name.
///
/// Identifiers are resolved to the variables bound by
/// the closest enclosing binder that binds them,
/// otherwise to the declared free variables.
///
/// ~~~
/// # use refterm::rc::{Ctx, Scope, Sort};
/// # use refterm::error::ScopeError;
/// let mut cx = Ctx::new();
/// let mut scope = Scope::new();
/// scope.declare("x", Sort::Int)?;
/// assert_eq!(scope.declare("x", Sort::Bool), Err(ScopeError::Redeclaration("x".into())));
///
/// let e = scope.expr(&mut cx, "|y: int| |x: int, z: bool| x + y")?;
/// assert_eq!(e.to_string(), "(λint. (λint, bool. (β0.0 + β1.0)))");
/// assert_eq!(scope.expr(&mut cx, "x + 1")?.to_string(), "(a0 + 1)");
/// # Ok::<_, refterm::Error>(())
/// ~~~
#[derive(Clone, Debug, Default)]
pub struct Scope {
    names: FnvHashMap<String, Name>,
    gen: NameGen,
    env: SortEnv,
    adts: FnvHashMap<String, AdtDef>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a fresh free variable of the given sort.
    pub fn declare(&mut self, name: &str, sort: Sort) -> Result<Name, Error> {
        if self.names.contains_key(name) {
            return Err(Error::Redeclaration(name.to_string()));
        }
        let x = self.gen.fresh();
        debug!("declare {} as {}: {}", name, x, sort);
        self.names.insert(name.to_string(), x);
        self.env.insert(x, sort);
        Ok(x)
    }

    /// Declare an ADT whose values are indexed by the given sort.
    pub fn declare_adt(&mut self, cx: &mut Ctx, name: &str, sort: Sort) -> Result<AdtDef, Error> {
        if self.adts.contains_key(name) {
            return Err(Error::Redeclaration(name.to_string()));
        }
        let def = cx.adt_def(name, sort);
        self.adts.insert(name.to_string(), def.clone());
        Ok(def)
    }

    /// Return the free variable declared with the given name.
    pub fn get(&self, name: &str) -> Option<Name> {
        self.names.get(name).copied()
    }

    /// Return the sorts of all declared free variables.
    pub fn sort_env(&self) -> &SortEnv {
        &self.env
    }

    /// Parse and scope a sort.
    pub fn sort(&self, cx: &mut Ctx, s: &str) -> Result<Sort, RtError> {
        Ok(self.scope_sort(cx, &refterm_parse::parse_sort(s)?))
    }

    /// Parse and scope a closed expression.
    pub fn expr(&self, cx: &mut Ctx, s: &str) -> Result<Expr, RtError> {
        Ok(self.scope_expr(cx, &refterm_parse::parse_expr(s)?)?)
    }

    /// Parse and scope a closed type.
    ///
    /// A base type without index, such as `i32`,
    /// stands for `{v: int. i32[v]}`.
    ///
    /// ~~~
    /// # use refterm::rc::{Ctx, Scope, Sort};
    /// let mut cx = Ctx::new();
    /// let mut scope = Scope::new();
    /// scope.declare_adt(&mut cx, "RVec", Sort::Int)?;
    /// let ty = scope.ty(&mut cx, "{n: int. &RVec<{i32 | true}>[n]}")?;
    /// assert_eq!(ty.to_string(), "{int. &RVec<{{int. i32[β0.0]} | true}>[β0.0]}");
    /// assert!(scope.ty(&mut cx, "Vec<i32>").is_err());
    /// assert!(scope.ty(&mut cx, "i32<bool>").is_err());
    /// # Ok::<_, refterm::Error>(())
    /// ~~~
    pub fn ty(&self, cx: &mut Ctx, s: &str) -> Result<Ty, RtError> {
        Ok(self.scope_ty(cx, &refterm_parse::parse_ty(s)?)?)
    }

    pub fn scope_sort(&self, cx: &mut Ctx, s: &syntax::Sort) -> Sort {
        use syntax::Sort::*;
        match s {
            Int => Sort::Int,
            Bool => Sort::Bool,
            Loc => Sort::Loc,
            Tuple(sorts) => {
                let sorts: Vec<_> = sorts.iter().map(|s| self.scope_sort(cx, s)).collect();
                cx.tuple_sort(sorts)
            }
            Func(inputs, output) => {
                let inputs: Vec<_> = inputs.iter().map(|s| self.scope_sort(cx, s)).collect();
                let output = self.scope_sort(cx, output);
                cx.func_sort(inputs, output)
            }
        }
    }

    /// Scope a closed expression.
    pub fn scope_expr(&self, cx: &mut Ctx, e: &syntax::Expr<&str>) -> Result<Expr, Error> {
        self.expr_in(cx, e, &mut Stack::new())
    }

    /// Scope a closed type.
    pub fn scope_ty(&self, cx: &mut Ctx, ty: &syntax::Ty<&str>) -> Result<Ty, Error> {
        self.ty_in(cx, ty, &mut Stack::new())
    }

    /// Scope parameters, returning their names and their sorts.
    fn params<'s>(
        &self,
        cx: &mut Ctx,
        ps: &[syntax::Param<&'s str>],
    ) -> (Vec<&'s str>, Vec<Sort>) {
        ps.iter().map(|(x, s)| (*x, self.scope_sort(cx, s))).unzip()
    }

    fn var(&self, cx: &mut Ctx, x: &str, bnd: &Bound) -> Result<Expr, Error> {
        let bvar = bnd.find(|vars| vars.iter().rposition(|v| *v == x));
        if let Some((debruijn, index)) = bvar {
            let debruijn = DebruijnIndex::from_u32(debruijn as u32);
            Ok(cx.bvar(BoundVar::new(debruijn, index as u32)))
        } else {
            let x = self.get(x).ok_or_else(|| Error::UndeclaredName(x.to_string()))?;
            Ok(cx.fvar(x))
        }
    }

    /// Scope an open expression using supplied bound variables.
    fn expr_in<'s>(
        &self,
        cx: &mut Ctx,
        e: &syntax::Expr<&'s str>,
        bnd: &mut Bound<'s>,
    ) -> Result<Expr, Error> {
        use syntax::Expr::*;
        Ok(match e {
            Var(x) => self.var(cx, x, bnd)?,
            Int(n) => cx.int(i128::try_from(*n).map_err(|_| Error::IntOutOfRange)?),
            // the only literal that is representable only when negated
            UnOp(syntax::UnOp::Neg, e) if **e == Int(i128::MIN.unsigned_abs()) => cx.int(i128::MIN),
            Bool(b) => cx.constant(Constant::Bool(*b)),
            Hole => cx.hole(),
            EVar(n) => cx.evar(crate::EVar::new(*n)),
            KVar(k, args) => {
                let args = self.exprs_in(cx, args, bnd)?;
                cx.kvar(KVid::new(*k), args)
            }
            BinOp(op, e1, e2) => {
                let e1 = self.expr_in(cx, e1, bnd)?;
                let e2 = self.expr_in(cx, e2, bnd)?;
                cx.binary_op(*op, e1, e2)
            }
            UnOp(op, e) => {
                let e = self.expr_in(cx, e, bnd)?;
                cx.unary_op(*op, e)
            }
            Tuple(es) => {
                let es = self.exprs_in(cx, es, bnd)?;
                cx.tuple(es)
            }
            Proj(e, field) => {
                let e = self.expr_in(cx, e, bnd)?;
                cx.proj(e, *field)
            }
            Ite(c, e1, e2) => {
                let c = self.expr_in(cx, c, bnd)?;
                let e1 = self.expr_in(cx, e1, bnd)?;
                let e2 = self.expr_in(cx, e2, bnd)?;
                cx.ite(c, e1, e2)
            }
            Abs(params, body) => {
                let (names, sorts) = self.params(cx, params);
                let body = bnd.with_pushed(names, |bnd| self.expr_in(cx, body, bnd))?;
                let vars = cx.sorts(sorts);
                cx.abs(Binder::new(body, vars))
            }
            App(func, args) => {
                let func = self.expr_in(cx, func, bnd)?;
                let args = self.exprs_in(cx, args, bnd)?;
                cx.app(func, args)
            }
        })
    }

    fn exprs_in<'s>(
        &self,
        cx: &mut Ctx,
        es: &[syntax::Expr<&'s str>],
        bnd: &mut Bound<'s>,
    ) -> Result<Vec<Expr>, Error> {
        es.iter().map(|e| self.expr_in(cx, e, bnd)).collect()
    }

    fn base<'s>(
        &self,
        cx: &mut Ctx,
        base: &syntax::Base<&'s str>,
        bnd: &mut Bound<'s>,
    ) -> Result<BaseTy, Error> {
        let name = base.name;
        let prim = if let Some(i) = IntTy::from_name(name) {
            Some(BaseTy::Int(i))
        } else if let Some(u) = UintTy::from_name(name) {
            Some(BaseTy::Uint(u))
        } else if name == "bool" {
            Some(BaseTy::Bool)
        } else {
            None
        };
        if let Some(bty) = prim {
            if !base.args.is_empty() {
                return Err(Error::UnexpectedArgs(name.to_string()));
            }
            return Ok(bty);
        }
        let def = self.adts.get(name);
        let def = def.ok_or_else(|| Error::UndeclaredAdt(name.to_string()))?.clone();
        let args = base.args.iter().map(|ty| self.ty_in(cx, ty, bnd));
        let args = args.collect::<Result<Vec<_>, _>>()?;
        Ok(cx.adt(def, args))
    }

    /// Scope an open type using supplied bound variables.
    fn ty_in<'s>(
        &self,
        cx: &mut Ctx,
        ty: &syntax::Ty<&'s str>,
        bnd: &mut Bound<'s>,
    ) -> Result<Ty, Error> {
        use syntax::Ty::*;
        Ok(match ty {
            Indexed(base, idx) => {
                let bty = self.base(cx, base, bnd)?;
                let idx = self.expr_in(cx, idx, bnd)?;
                cx.indexed(bty, idx)
            }
            // the base is placed below a new binder
            Base(base) => {
                let bty = bnd.with_pushed(Vec::from([""]), |bnd| self.base(cx, base, bnd))?;
                cx.exists_base(bty)
            }
            Exists(params, ty) => {
                let (names, sorts) = self.params(cx, params);
                let ty = bnd.with_pushed(names, |bnd| self.ty_in(cx, ty, bnd))?;
                let vars = cx.sorts(sorts);
                cx.exists(Binder::new(ty, vars))
            }
            Constr(ty, pred) => {
                let ty = self.ty_in(cx, ty, bnd)?;
                let pred = self.expr_in(cx, pred, bnd)?;
                cx.constr(pred, ty)
            }
            Tuple(tys) => {
                let tys = tys.iter().map(|ty| self.ty_in(cx, ty, bnd));
                let tys = tys.collect::<Result<Vec<_>, _>>()?;
                cx.tuple_ty(tys)
            }
            Ref(mutable, ty) => {
                let rk = if *mutable { RefKind::Mut } else { RefKind::Shr };
                let ty = self.ty_in(cx, ty, bnd)?;
                cx.mk_ref(rk, ty)
            }
            Param(index) => cx.param(ParamTy { index: *index }),
            Uninit => cx.uninit(),
            Never => cx.never(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error as RtError;
    use refterm_parse::Error as ParseError;

    fn scope(cx: &mut Ctx) -> Scope {
        let mut scope = Scope::new();
        scope.declare("n", Sort::Int).unwrap();
        scope.declare("p", Sort::Bool).unwrap();
        scope.declare_adt(cx, "Vec", Sort::Int).unwrap();
        scope
    }

    #[test]
    fn names() {
        let mut cx = Ctx::new();
        let mut scope = scope(&mut cx);
        assert_eq!(scope.get("p"), Some(Name::new(1)));
        assert_eq!(scope.declare("n", Sort::Loc), Err(Error::Redeclaration("n".into())));
        let vec = scope.declare_adt(&mut cx, "Vec", Sort::Bool);
        assert_eq!(vec, Err(Error::Redeclaration("Vec".into())));
        assert_eq!(scope.sort_env().get(&Name::new(0)), Some(&Sort::Int));
    }

    #[test]
    fn expressions() -> Result<(), RtError> {
        let mut cx = Ctx::new();
        let scope = scope(&mut cx);
        let e = scope.expr(&mut cx, "|n: int| (n, p).0 == $3(n, ?1, *)")?;
        assert_eq!(e.to_string(), "(λint. ((β0.0, a1).0 == $3(β0.0, ?1, *)))");
        let e = scope.expr(&mut cx, "if p { -n } else { (|| n)() }")?;
        assert_eq!(e.to_string(), "if a1 { -a0 } else { (λ. a0)() }");
        // shadowing within one binder
        let e = scope.expr(&mut cx, "|x: int, x: bool| x")?;
        assert_eq!(e.to_string(), "(λint, bool. β0.1)");
        Ok(())
    }

    #[test]
    fn expression_errors() {
        let mut cx = Ctx::new();
        let scope = scope(&mut cx);
        let mut err = |s: &str| scope.expr(&mut cx, s).map(|_| ());
        let undeclared = Error::UndeclaredName("m".into());
        assert_eq!(err("n + m"), Err(RtError::Scope(undeclared)));
        let big = "170141183460469231731687303715884105728";
        assert_eq!(err(big), Err(RtError::Scope(Error::IntOutOfRange)));
        assert_eq!(err("-170141183460469231731687303715884105728"), Ok(()));
        let too_big = "340282366920938463463374607431768211456";
        assert_eq!(err(too_big), Err(RtError::Parse(ParseError::IntTooLarge)));
        assert_eq!(err("n +"), Err(RtError::Parse(ParseError::UnexpectedEnd("expression"))));
        // bound variables do not escape their binder
        let undeclared = Error::UndeclaredName("x".into());
        assert_eq!(err("(|x: int| x)(1) + x"), Err(RtError::Scope(undeclared)));

        let min = scope.expr(&mut cx, "-170141183460469231731687303715884105728");
        assert_eq!(min, Ok(cx.int(i128::MIN)));
    }

    #[test]
    fn types() -> Result<(), RtError> {
        let mut cx = Ctx::new();
        let scope = scope(&mut cx);
        let ty = scope.ty(&mut cx, "{v: int. Vec<{i32[v] | v < n}>[v]}")?;
        let expected = "{int. Vec<{i32[β0.0] | (β0.0 < a0)}>[β0.0]}";
        assert_eq!(ty.to_string(), expected);

        // the outer variable is shifted below the binder of the inner `Vec`
        let ty = scope.ty(&mut cx, "{v: int. Vec<Vec<i32[v]>>[v]}")?;
        let expected = "{int. Vec<{int. Vec<i32[β1.0]>[β0.0]}>[β0.0]}";
        assert_eq!(ty.to_string(), expected);

        let ty = scope.ty(&mut cx, "{v: int. Vec<{i32 | v > 0}>[v]}")?;
        let expected = "{int. Vec<{{int. i32[β0.0]} | (β0.0 > 0)}>[β0.0]}";
        assert_eq!(ty.to_string(), expected);

        let ty = scope.ty(&mut cx, "(&u8, &mut bool[p], #1, uninit, !)")?;
        let expected = "(&{int. u8[β0.0]}, &mut bool[a1], #1, uninit, !)";
        assert_eq!(ty.to_string(), expected);
        Ok(())
    }

    #[test]
    fn type_errors() {
        let mut cx = Ctx::new();
        let scope = scope(&mut cx);
        let mut err = |s: &str| scope.ty(&mut cx, s).map(|_| ());
        assert_eq!(err("Box<i32>"), Err(RtError::Scope(Error::UndeclaredAdt("Box".into()))));
        assert_eq!(err("i32<i32>"), Err(RtError::Scope(Error::UnexpectedArgs("i32".into()))));
        assert_eq!(err("i32[v]"), Err(RtError::Scope(Error::UndeclaredName("v".into()))));
    }

    #[test]
    fn sorts() -> Result<(), RtError> {
        let mut cx = Ctx::new();
        let scope = Scope::new();
        let s = scope.sort(&mut cx, "fn(int, (bool, loc)) -> int")?;
        assert_eq!(s.to_string(), "fn(int, (bool, loc)) -> int");
        assert_eq!(s.as_func().map(|(inputs, _)| inputs.len()), Some(2));
        Ok(())
    }
}
