//! Substitution and shifting of variables.

use super::{Binder, Ctx, Expr, ExprKind, FallibleTypeFolder, Ty, TyKind, TypeFoldable, TypeFolder};
use crate::error::SubstError as Error;
use crate::{BoundVar, DebruijnIndex, Name};
use alloc::vec::Vec;
use fnv::FnvHashMap;

/// Shift the bound variables that escape the term by a fixed amount.
pub(crate) struct Shifter<'a> {
    cx: &'a mut Ctx,
    /// binders entered so far
    outer: DebruijnIndex,
    amount: u32,
    shift_in: bool,
}

impl<'a> Shifter<'a> {
    pub(crate) fn new(cx: &'a mut Ctx, amount: u32, shift_in: bool) -> Self {
        let outer = DebruijnIndex::INNERMOST;
        Self {
            cx,
            outer,
            amount,
            shift_in,
        }
    }
}

impl TypeFolder for Shifter<'_> {
    fn cx(&mut self) -> &mut Ctx {
        self.cx
    }

    fn fold_binder<T: TypeFoldable>(&mut self, t: &Binder<T>) -> Binder<T> {
        self.outer.shift_in(1);
        let t = t.super_fold_with(self);
        self.outer.shift_out(1);
        t
    }

    fn fold_expr(&mut self, e: &Expr) -> Expr {
        match e.kind() {
            ExprKind::BoundVar(bvar) if bvar.debruijn >= self.outer && self.amount > 0 => {
                let debruijn = if self.shift_in {
                    bvar.debruijn.shifted_in(self.amount)
                } else {
                    bvar.debruijn.shifted_out(self.amount)
                };
                self.cx.bvar(BoundVar::new(debruijn, bvar.index))
            }
            _ => e.super_fold_with(self),
        }
    }
}

/// Replace the variables of one binder by expressions.
struct BVarSubst<'a> {
    cx: &'a mut Ctx,
    outer: DebruijnIndex,
    args: &'a [Expr],
}

impl FallibleTypeFolder for BVarSubst<'_> {
    type Error = Error;

    fn cx(&mut self) -> &mut Ctx {
        self.cx
    }

    fn try_fold_binder<T: TypeFoldable>(&mut self, t: &Binder<T>) -> Result<Binder<T>, Error> {
        self.outer.shift_in(1);
        let t = t.try_super_fold_with(self);
        self.outer.shift_out(1);
        t
    }

    fn try_fold_expr(&mut self, e: &Expr) -> Result<Expr, Error> {
        match e.kind() {
            ExprKind::BoundVar(bvar) if bvar.debruijn == self.outer => {
                let args = self.args;
                let arg = args.get(bvar.index as usize);
                let arg = arg.ok_or(Error::BVarOutOfRange(*bvar))?;
                Ok(arg.shift_in_escaping(self.cx, self.outer.as_u32()))
            }
            ExprKind::BoundVar(bvar) if bvar.debruijn > self.outer => {
                let debruijn = bvar.debruijn.shifted_out(1);
                Ok(self.cx.bvar(BoundVar::new(debruijn, bvar.index)))
            }
            _ => e.try_super_fold_with(self),
        }
    }
}

impl<T: TypeFoldable> Binder<T> {
    /// Replace the variables of the binder by `args`.
    ///
    /// Variables bound further outside are shifted
    /// to account for the removed binder.
    ///
    /// ~~~
    /// # use refterm::rc::{Binder, Ctx, Sort};
    /// # use refterm::{BoundVar, DebruijnIndex, Name};
    /// let mut cx = Ctx::new();
    /// let x = cx.bvar(BoundVar::new(DebruijnIndex::INNERMOST, 1));
    /// let outer = cx.bvar(BoundVar::new(DebruijnIndex::from_u32(1), 0));
    /// let body = cx.add(x, outer);
    /// let vars = cx.sorts([Sort::Int, Sort::Int]);
    /// let b = Binder::new(body, vars);
    ///
    /// let (a0, a1) = (cx.fvar(Name::new(0)), cx.fvar(Name::new(1)));
    /// let e = b.instantiate(&mut cx, &[a0.clone(), a1])?;
    /// assert_eq!(e.to_string(), "(a1 + β0.0)");
    /// assert!(b.instantiate(&mut cx, &[a0]).is_err());
    /// # Ok::<_, refterm::Error>(())
    /// ~~~
    pub fn instantiate(&self, cx: &mut Ctx, args: &[Expr]) -> Result<T, Error> {
        if args.len() != self.vars().len() {
            return Err(Error::ArityMismatch {
                expected: self.vars().len(),
                found: args.len(),
            });
        }
        let outer = DebruijnIndex::INNERMOST;
        let mut folder = BVarSubst { cx, outer, args };
        self.value().try_fold_with(&mut folder)
    }

    /// Replace the variables of the binder by `f(cx, i, sort)`,
    /// where `i` is the position of the variable in the binder.
    pub fn instantiate_with<F>(&self, cx: &mut Ctx, mut f: F) -> Result<T, Error>
    where
        F: FnMut(&mut Ctx, u32, &super::Sort) -> Expr,
    {
        let vars = self.vars().clone();
        let args: Vec<_> = (0..).zip(vars.iter()).map(|(i, s)| f(cx, i, s)).collect();
        self.instantiate(cx, &args)
    }
}

/// Replace generic type parameters by types.
pub(crate) struct GenericsSubst<'a> {
    cx: &'a mut Ctx,
    outer: DebruijnIndex,
    args: &'a [Ty],
}

impl<'a> GenericsSubst<'a> {
    pub(crate) fn new(cx: &'a mut Ctx, args: &'a [Ty]) -> Self {
        let outer = DebruijnIndex::INNERMOST;
        Self { cx, outer, args }
    }
}

impl FallibleTypeFolder for GenericsSubst<'_> {
    type Error = Error;

    fn cx(&mut self) -> &mut Ctx {
        self.cx
    }

    fn try_fold_binder<T: TypeFoldable>(&mut self, t: &Binder<T>) -> Result<Binder<T>, Error> {
        self.outer.shift_in(1);
        let t = t.try_super_fold_with(self);
        self.outer.shift_out(1);
        t
    }

    fn try_fold_ty(&mut self, ty: &Ty) -> Result<Ty, Error> {
        match ty.kind() {
            TyKind::Param(p) => {
                let args = self.args;
                let arg = args.get(p.index as usize);
                let arg = arg.ok_or(Error::MissingGenericArg(*p))?;
                Ok(arg.shift_in_escaping(self.cx, self.outer.as_u32()))
            }
            _ => ty.try_super_fold_with(self),
        }
    }
}

/// Map from free variables to expressions.
#[derive(Clone, Debug, Default)]
pub struct FVarSubst {
    map: FnvHashMap<Name, Expr>,
}

impl FVarSubst {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Name, e: Expr) -> Option<Expr> {
        self.map.insert(name, e)
    }

    pub fn get(&self, name: &Name) -> Option<&Expr> {
        self.map.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromIterator<(Name, Expr)> for FVarSubst {
    fn from_iter<I: IntoIterator<Item = (Name, Expr)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

pub(crate) struct FVarFolder<'a> {
    cx: &'a mut Ctx,
    outer: DebruijnIndex,
    subst: &'a FVarSubst,
}

impl<'a> FVarFolder<'a> {
    pub(crate) fn new(cx: &'a mut Ctx, subst: &'a FVarSubst) -> Self {
        let outer = DebruijnIndex::INNERMOST;
        Self { cx, outer, subst }
    }
}

impl TypeFolder for FVarFolder<'_> {
    fn cx(&mut self) -> &mut Ctx {
        self.cx
    }

    fn fold_binder<T: TypeFoldable>(&mut self, t: &Binder<T>) -> Binder<T> {
        self.outer.shift_in(1);
        let t = t.super_fold_with(self);
        self.outer.shift_out(1);
        t
    }

    fn fold_expr(&mut self, e: &Expr) -> Expr {
        match e.kind() {
            ExprKind::FreeVar(name) => match self.subst.map.get(name) {
                Some(e) => e.shift_in_escaping(self.cx, self.outer.as_u32()),
                None => e.clone(),
            },
            _ => e.super_fold_with(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IntTy, ParamTy, RefKind};
    use super::super::{BaseTy, Sort, TypeVisitable};
    use alloc::string::{String, ToString};

    fn bvar(cx: &mut Ctx, debruijn: u32, index: u32) -> Expr {
        cx.bvar(BoundVar::new(DebruijnIndex::from_u32(debruijn), index))
    }

    /// `|x: int| x + β<debruijn>.0`
    fn lam(cx: &mut Ctx, debruijn: u32) -> Expr {
        let x = bvar(cx, 0, 0);
        let y = bvar(cx, debruijn, 0);
        let body = cx.add(x, y);
        let vars = cx.sorts([Sort::Int]);
        cx.abs(Binder::new(body, vars))
    }

    #[test]
    fn shift_round_trip() {
        let mut cx = Ctx::new();
        let e = lam(&mut cx, 1);
        let shifted = e.shift_in_escaping(&mut cx, 2);
        assert_eq!(shifted, lam(&mut cx, 3));
        assert_eq!(shifted.shift_out_escaping(&mut cx, 2), e);
        assert!(e.shift_in_escaping(&mut cx, 0).ptr_eq(&e));
    }

    #[test]
    fn closed_terms_are_not_shifted() {
        let mut cx = Ctx::new();
        let e = lam(&mut cx, 0);
        assert!(!e.has_escaping_bvars());
        assert!(e.shift_in_escaping(&mut cx, 5).ptr_eq(&e));
    }

    #[test]
    fn instantiate_under_binder() -> Result<(), Error> {
        let mut cx = Ctx::new();
        // the argument refers to an outer binder, so it is shifted below the lambda
        let arg = bvar(&mut cx, 0, 3);
        let body = lam(&mut cx, 1);
        let vars = cx.sorts([Sort::Int]);
        let b = Binder::new(body, vars);
        let e = b.instantiate(&mut cx, &[arg])?;
        let x = bvar(&mut cx, 0, 0);
        let y = bvar(&mut cx, 1, 3);
        let body = cx.add(x, y);
        let vars = cx.sorts([Sort::Int]);
        assert_eq!(e, cx.abs(Binder::new(body, vars)));
        Ok(())
    }

    #[test]
    fn out_of_range() {
        let mut cx = Ctx::new();
        let body = bvar(&mut cx, 0, 1);
        let vars = cx.sorts([Sort::Int]);
        let arg = cx.int(0);
        let res = Binder::new(body, vars).instantiate(&mut cx, &[arg]);
        let expected = BoundVar::new(DebruijnIndex::INNERMOST, 1);
        assert_eq!(res, Err(Error::BVarOutOfRange(expected)));
    }

    #[test]
    fn instantiate_with_positions() -> Result<(), Error> {
        let mut cx = Ctx::new();
        let (x, y) = (bvar(&mut cx, 0, 0), bvar(&mut cx, 0, 1));
        let body = cx.tuple([x, y]);
        let vars = cx.sorts([Sort::Int, Sort::Bool]);
        let b = Binder::new(body, vars);
        let e = b.instantiate_with(&mut cx, |cx, i, sort| match sort {
            Sort::Int => cx.int(i.into()),
            _ => cx.tt(),
        })?;
        assert_eq!(e.to_string(), "(0, true)");
        Ok(())
    }

    #[test]
    fn generics() {
        let mut cx = Ctx::new();
        let p0 = cx.param(ParamTy { index: 0 });
        let p1 = cx.param(ParamTy { index: 1 });
        let ty = cx.tuple_ty([p0, p1.clone()]);
        let ty = cx.mk_ref(RefKind::Shr, ty);
        let int = cx.exists_base(BaseTy::Int(IntTy::I32));
        let never = cx.never();
        let res = ty.subst_generics(&mut cx, &[int, never]);
        assert_eq!(res.map(|t| t.to_string()), Ok(String::from("&({int. i32[β0.0]}, !)")));
        let err = p1.subst_generics(&mut cx, &[]);
        assert_eq!(err, Err(Error::MissingGenericArg(ParamTy { index: 1 })));
    }

    #[test]
    fn fvars() {
        let mut cx = Ctx::new();
        let (a, b) = (Name::new(0), Name::new(1));
        let outer = bvar(&mut cx, 0, 0);
        let subst: FVarSubst = [(a, outer)].into_iter().collect();
        // `|x: int| a + b`
        let (ea, eb) = (cx.fvar(a), cx.fvar(b));
        let body = cx.add(ea, eb);
        let vars = cx.sorts([Sort::Int]);
        let e = cx.abs(Binder::new(body, vars));
        let e = e.subst_fvars(&mut cx, &subst);
        assert_eq!(e.to_string(), "(λint. (β1.0 + a1))");
        assert_eq!(e.fvars().len(), 1);
    }
}
