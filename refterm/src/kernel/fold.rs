//! Generic traversal of terms.
//!
//! A *folder* transforms terms and a *visitor* inspects them.
//! Both only need to handle the interesting cases, such as
//! a particular kind of expression, and
//! leave the remaining cases to the `super_*` methods,
//! which traverse the children of a term.

use super::{BaseTy, Binder, Ctx, Expr, ExprKind, FnSig, KVar, List, Ty, TyKind};
use super::{EVarSol, FVarSubst, SliceInternable};
use crate::error::{EVarError, SubstError};
use crate::{DebruijnIndex, EVar, Name};
use alloc::vec::Vec;
use core::convert::Infallible;
use core::ops::ControlFlow;
use fnv::FnvHashSet;

/// Transformation of terms that may fail.
pub trait FallibleTypeFolder: Sized {
    type Error;

    fn cx(&mut self) -> &mut Ctx;

    fn try_fold_binder<T: TypeFoldable>(&mut self, t: &Binder<T>) -> Result<Binder<T>, Self::Error> {
        t.try_super_fold_with(self)
    }

    fn try_fold_ty(&mut self, ty: &Ty) -> Result<Ty, Self::Error> {
        ty.try_super_fold_with(self)
    }

    fn try_fold_expr(&mut self, e: &Expr) -> Result<Expr, Self::Error> {
        e.try_super_fold_with(self)
    }
}

/// Transformation of terms.
pub trait TypeFolder: Sized {
    fn cx(&mut self) -> &mut Ctx;

    fn fold_binder<T: TypeFoldable>(&mut self, t: &Binder<T>) -> Binder<T> {
        t.super_fold_with(self)
    }

    fn fold_ty(&mut self, ty: &Ty) -> Ty {
        ty.super_fold_with(self)
    }

    fn fold_expr(&mut self, e: &Expr) -> Expr {
        e.super_fold_with(self)
    }
}

impl<F: TypeFolder> FallibleTypeFolder for F {
    type Error = Infallible;

    fn cx(&mut self) -> &mut Ctx {
        TypeFolder::cx(self)
    }

    fn try_fold_binder<T: TypeFoldable>(&mut self, t: &Binder<T>) -> Result<Binder<T>, Infallible> {
        Ok(self.fold_binder(t))
    }

    fn try_fold_ty(&mut self, ty: &Ty) -> Result<Ty, Infallible> {
        Ok(self.fold_ty(ty))
    }

    fn try_fold_expr(&mut self, e: &Expr) -> Result<Expr, Infallible> {
        Ok(self.fold_expr(e))
    }
}

/// Inspection of terms that may stop early with a value of type `BreakTy`.
pub trait TypeVisitor: Sized {
    type BreakTy;

    fn visit_binder<T: TypeVisitable>(&mut self, t: &Binder<T>) -> ControlFlow<Self::BreakTy> {
        t.super_visit_with(self)
    }

    fn visit_ty(&mut self, ty: &Ty) -> ControlFlow<Self::BreakTy> {
        ty.super_visit_with(self)
    }

    fn visit_expr(&mut self, e: &Expr) -> ControlFlow<Self::BreakTy> {
        e.super_visit_with(self)
    }

    fn visit_fvar(&mut self, _name: Name) -> ControlFlow<Self::BreakTy> {
        ControlFlow::Continue(())
    }
}

fn into_ok<T>(r: Result<T, Infallible>) -> T {
    match r {
        Ok(x) => x,
        Err(e) => match e {},
    }
}

pub trait TypeVisitable: Sized {
    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy>;

    fn visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        self.super_visit_with(visitor)
    }

    /// Return true if the term contains bound variables whose binder is outside of it.
    fn has_escaping_bvars(&self) -> bool {
        self.has_escaping_bvars_at_or_above(DebruijnIndex::INNERMOST)
    }

    /// Return true if the term contains bound variables whose binder is
    /// `binder` or further outside, counted from the term.
    fn has_escaping_bvars_at_or_above(&self, binder: DebruijnIndex) -> bool {
        struct HasEscapingVars {
            outer_index: DebruijnIndex,
        }

        impl TypeVisitor for HasEscapingVars {
            type BreakTy = ();

            fn visit_binder<T: TypeVisitable>(&mut self, t: &Binder<T>) -> ControlFlow<()> {
                self.outer_index.shift_in(1);
                let r = t.super_visit_with(self);
                self.outer_index.shift_out(1);
                r
            }

            fn visit_expr(&mut self, e: &Expr) -> ControlFlow<()> {
                match e.kind() {
                    ExprKind::BoundVar(bvar) if bvar.debruijn >= self.outer_index => {
                        ControlFlow::Break(())
                    }
                    _ => e.super_visit_with(self),
                }
            }
        }

        let mut visitor = HasEscapingVars {
            outer_index: binder,
        };
        self.visit_with(&mut visitor).is_break()
    }

    /// Return the set of all free variables.
    ///
    /// For example, `{Vec<i32[n]>[v] | v > m}` returns `{n, m}`.
    fn fvars(&self) -> FnvHashSet<Name> {
        struct CollectFreeVars(FnvHashSet<Name>);

        impl TypeVisitor for CollectFreeVars {
            type BreakTy = Infallible;

            fn visit_fvar(&mut self, name: Name) -> ControlFlow<Infallible> {
                self.0.insert(name);
                ControlFlow::Continue(())
            }
        }

        let mut collector = CollectFreeVars(FnvHashSet::default());
        let _ = self.visit_with(&mut collector);
        collector.0
    }

    fn has_holes(&self) -> bool {
        struct HasHoles;

        impl TypeVisitor for HasHoles {
            type BreakTy = ();

            fn visit_expr(&mut self, e: &Expr) -> ControlFlow<()> {
                if e.is_hole() {
                    ControlFlow::Break(())
                } else {
                    e.super_visit_with(self)
                }
            }
        }

        self.visit_with(&mut HasHoles).is_break()
    }

    /// Return the set of all existential variables.
    fn evars(&self) -> FnvHashSet<EVar> {
        struct CollectEVars(FnvHashSet<EVar>);

        impl TypeVisitor for CollectEVars {
            type BreakTy = Infallible;

            fn visit_expr(&mut self, e: &Expr) -> ControlFlow<Infallible> {
                if let ExprKind::EVar(evar) = e.kind() {
                    self.0.insert(*evar);
                }
                e.super_visit_with(self)
            }
        }

        let mut collector = CollectEVars(FnvHashSet::default());
        let _ = self.visit_with(&mut collector);
        collector.0
    }
}

pub trait TypeFoldable: TypeVisitable {
    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error>;

    fn try_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        self.try_super_fold_with(folder)
    }

    fn fold_with<F: TypeFolder>(&self, folder: &mut F) -> Self {
        into_ok(self.try_fold_with(folder))
    }

    fn super_fold_with<F: TypeFolder>(&self, folder: &mut F) -> Self {
        into_ok(self.try_super_fold_with(folder))
    }

    /// Shift all escaping bound variables `amount` binders outwards.
    ///
    /// This is used when moving a term below `amount` binders.
    fn shift_in_escaping(&self, cx: &mut Ctx, amount: u32) -> Self {
        self.fold_with(&mut super::subst::Shifter::new(cx, amount, true))
    }

    /// Shift all escaping bound variables `amount` binders inwards.
    ///
    /// This is used when moving a term out of `amount` binders that
    /// the term does not refer to.
    fn shift_out_escaping(&self, cx: &mut Ctx, amount: u32) -> Self {
        self.fold_with(&mut super::subst::Shifter::new(cx, amount, false))
    }

    /// Replace all holes by `f(cx, scope)`.
    ///
    /// The scope holds the variable sorts of all binders enclosing a hole,
    /// starting with the outermost binder.
    fn replace_holes(&self, cx: &mut Ctx, f: impl FnMut(&mut Ctx, &[List<super::Sort>]) -> Expr) -> Self {
        self.fold_with(&mut super::kvars::ReplaceHoles::new(cx, f))
    }

    /// Replace all refinements by holes.
    ///
    /// For example, `Vec<{i32[v] | v > 0}>[n]` becomes
    /// `{v: int. {Vec<{v: int. {i32[v] | *}}>[v] | *}}`.
    fn with_holes(&self, cx: &mut Ctx) -> Self {
        self.fold_with(&mut super::kvars::WithHoles { cx })
    }

    /// Replace existential variables by their solutions.
    fn replace_evars(&self, cx: &mut Ctx, sol: &EVarSol) -> Result<Self, EVarError> {
        self.try_fold_with(&mut super::evars::ReplaceEVars::new(cx, sol))
    }

    /// Replace generic type parameters `#i` by the `i`-th argument.
    fn subst_generics(&self, cx: &mut Ctx, args: &[Ty]) -> Result<Self, SubstError> {
        self.try_fold_with(&mut super::subst::GenericsSubst::new(cx, args))
    }

    /// Replace free variables by the expressions they are mapped to.
    fn subst_fvars(&self, cx: &mut Ctx, subst: &FVarSubst) -> Self {
        self.fold_with(&mut super::subst::FVarFolder::new(cx, subst))
    }

    /// Perform beta reduction and constant folding.
    ///
    /// The number of beta reductions and their nesting are bounded,
    /// so ill-sorted terms without normal form, such as
    /// `(|f: int| f(f))(|f: int| f(f))`, are returned partially reduced.
    fn normalize(&self, cx: &mut Ctx) -> Self {
        self.fold_with(&mut super::normalize::Normalizer::new(cx))
    }
}

impl TypeVisitable for Expr {
    fn visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        visitor.visit_expr(self)
    }

    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        match self.kind() {
            ExprKind::FreeVar(name) => visitor.visit_fvar(*name),
            ExprKind::BoundVar(_) | ExprKind::EVar(_) | ExprKind::Constant(_) | ExprKind::Hole => {
                ControlFlow::Continue(())
            }
            ExprKind::BinaryOp(_, e1, e2) => {
                e1.visit_with(visitor)?;
                e2.visit_with(visitor)
            }
            ExprKind::UnaryOp(_, e) | ExprKind::TupleProj(e, _) => e.visit_with(visitor),
            ExprKind::Tuple(es) => es.visit_with(visitor),
            ExprKind::IfThenElse(c, e1, e2) => {
                c.visit_with(visitor)?;
                e1.visit_with(visitor)?;
                e2.visit_with(visitor)
            }
            ExprKind::KVar(kvar) => kvar.visit_with(visitor),
            ExprKind::Abs(body) => body.visit_with(visitor),
            ExprKind::App(func, args) => {
                func.visit_with(visitor)?;
                args.visit_with(visitor)
            }
        }
    }
}

impl TypeFoldable for Expr {
    fn try_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        folder.try_fold_expr(self)
    }

    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        let kind = match self.kind() {
            ExprKind::FreeVar(_)
            | ExprKind::BoundVar(_)
            | ExprKind::EVar(_)
            | ExprKind::Constant(_)
            | ExprKind::Hole => return Ok(self.clone()),
            ExprKind::BinaryOp(op, e1, e2) => {
                let e1 = e1.try_fold_with(folder)?;
                ExprKind::BinaryOp(*op, e1, e2.try_fold_with(folder)?)
            }
            ExprKind::UnaryOp(op, e) => ExprKind::UnaryOp(*op, e.try_fold_with(folder)?),
            ExprKind::Tuple(es) => ExprKind::Tuple(es.try_fold_with(folder)?),
            ExprKind::TupleProj(e, field) => ExprKind::TupleProj(e.try_fold_with(folder)?, *field),
            ExprKind::IfThenElse(c, e1, e2) => ExprKind::IfThenElse(
                c.try_fold_with(folder)?,
                e1.try_fold_with(folder)?,
                e2.try_fold_with(folder)?,
            ),
            ExprKind::KVar(kvar) => ExprKind::KVar(kvar.try_fold_with(folder)?),
            ExprKind::Abs(body) => ExprKind::Abs(body.try_fold_with(folder)?),
            ExprKind::App(func, args) => {
                let func = func.try_fold_with(folder)?;
                ExprKind::App(func, args.try_fold_with(folder)?)
            }
        };
        // children are compared by pointer first, so this is cheap
        if kind == **self {
            Ok(self.clone())
        } else {
            Ok(folder.cx().mk_expr(kind))
        }
    }
}

impl TypeVisitable for Ty {
    fn visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        visitor.visit_ty(self)
    }

    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        match self.kind() {
            TyKind::Indexed(bty, idx) => {
                bty.visit_with(visitor)?;
                idx.visit_with(visitor)
            }
            TyKind::Exists(ty) => ty.visit_with(visitor),
            TyKind::Constr(pred, ty) => {
                pred.visit_with(visitor)?;
                ty.visit_with(visitor)
            }
            TyKind::Tuple(tys) => tys.visit_with(visitor),
            TyKind::Ref(_, ty) => ty.visit_with(visitor),
            TyKind::Param(_) | TyKind::Uninit | TyKind::Never => ControlFlow::Continue(()),
        }
    }
}

impl TypeFoldable for Ty {
    fn try_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        folder.try_fold_ty(self)
    }

    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        let kind = match self.kind() {
            TyKind::Indexed(bty, idx) => {
                TyKind::Indexed(bty.try_fold_with(folder)?, idx.try_fold_with(folder)?)
            }
            TyKind::Exists(ty) => TyKind::Exists(ty.try_fold_with(folder)?),
            TyKind::Constr(pred, ty) => {
                TyKind::Constr(pred.try_fold_with(folder)?, ty.try_fold_with(folder)?)
            }
            TyKind::Tuple(tys) => TyKind::Tuple(tys.try_fold_with(folder)?),
            TyKind::Ref(rk, ty) => TyKind::Ref(*rk, ty.try_fold_with(folder)?),
            TyKind::Param(_) | TyKind::Uninit | TyKind::Never => return Ok(self.clone()),
        };
        if kind == **self {
            Ok(self.clone())
        } else {
            Ok(folder.cx().mk_ty(kind))
        }
    }
}

impl TypeVisitable for BaseTy {
    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        match self {
            BaseTy::Adt(_, args) => args.visit_with(visitor),
            BaseTy::Int(_) | BaseTy::Uint(_) | BaseTy::Bool => ControlFlow::Continue(()),
        }
    }
}

impl TypeFoldable for BaseTy {
    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        match self {
            BaseTy::Adt(def, args) => Ok(BaseTy::Adt(def.clone(), args.try_fold_with(folder)?)),
            BaseTy::Int(_) | BaseTy::Uint(_) | BaseTy::Bool => Ok(self.clone()),
        }
    }
}

impl<T: TypeVisitable> TypeVisitable for Binder<T> {
    fn visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        visitor.visit_binder(self)
    }

    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        self.value().visit_with(visitor)
    }
}

impl<T: TypeFoldable> TypeFoldable for Binder<T> {
    fn try_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        folder.try_fold_binder(self)
    }

    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        let value = self.value().try_fold_with(folder)?;
        Ok(Binder::new(value, self.vars().clone()))
    }
}

impl TypeVisitable for KVar {
    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        self.args.visit_with(visitor)
    }
}

impl TypeFoldable for KVar {
    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        let args = self.args.try_fold_with(folder)?;
        Ok(KVar { kvid: self.kvid, args })
    }
}

impl TypeVisitable for FnSig {
    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        self.requires.visit_with(visitor)?;
        self.inputs.visit_with(visitor)?;
        self.output.visit_with(visitor)?;
        self.ensures.visit_with(visitor)
    }
}

impl TypeFoldable for FnSig {
    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        Ok(FnSig {
            requires: self.requires.try_fold_with(folder)?,
            inputs: self.inputs.try_fold_with(folder)?,
            output: self.output.try_fold_with(folder)?,
            ensures: self.ensures.try_fold_with(folder)?,
        })
    }
}

impl<T: TypeVisitable> TypeVisitable for List<T> {
    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        self.iter().try_for_each(|x| x.visit_with(visitor))
    }
}

impl<T: TypeFoldable + SliceInternable> TypeFoldable for List<T> {
    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        let xs = self
            .iter()
            .map(|x| x.try_fold_with(folder))
            .collect::<Result<Vec<_>, _>>()?;
        if xs[..] == self[..] {
            Ok(self.clone())
        } else {
            Ok(folder.cx().mk_list(xs))
        }
    }
}

impl<T: TypeVisitable> TypeVisitable for Vec<T> {
    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        self.iter().try_for_each(|x| x.visit_with(visitor))
    }
}

impl<T: TypeFoldable> TypeFoldable for Vec<T> {
    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        self.iter().map(|x| x.try_fold_with(folder)).collect()
    }
}

impl<T: TypeVisitable> TypeVisitable for Option<T> {
    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        match self {
            Some(x) => x.visit_with(visitor),
            None => ControlFlow::Continue(()),
        }
    }
}

impl<T: TypeFoldable> TypeFoldable for Option<T> {
    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        self.as_ref().map(|x| x.try_fold_with(folder)).transpose()
    }
}

impl<A: TypeVisitable, B: TypeVisitable> TypeVisitable for (A, B) {
    fn super_visit_with<V: TypeVisitor>(&self, visitor: &mut V) -> ControlFlow<V::BreakTy> {
        self.0.visit_with(visitor)?;
        self.1.visit_with(visitor)
    }
}

impl<A: TypeFoldable, B: TypeFoldable> TypeFoldable for (A, B) {
    fn try_super_fold_with<F: FallibleTypeFolder>(&self, folder: &mut F) -> Result<Self, F::Error> {
        Ok((self.0.try_fold_with(folder)?, self.1.try_fold_with(folder)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundVar, IntTy};
    use alloc::string::ToString;

    struct Identity<'a>(&'a mut Ctx);

    impl TypeFolder for Identity<'_> {
        fn cx(&mut self) -> &mut Ctx {
            self.0
        }
    }

    /// Replace every integer constant by its successor.
    struct Succ<'a>(&'a mut Ctx);

    impl TypeFolder for Succ<'_> {
        fn cx(&mut self) -> &mut Ctx {
            self.0
        }

        fn fold_expr(&mut self, e: &Expr) -> Expr {
            match e.as_constant().and_then(|c| c.as_int()) {
                Some(i) => self.0.int(i + 1),
                None => e.super_fold_with(self),
            }
        }
    }

    fn sample(cx: &mut Ctx) -> Ty {
        let x = cx.fvar(Name::new(0));
        let one = cx.int(1);
        let sum = cx.add(x, one);
        let nu = cx.nu();
        let pred = cx.gt(nu.clone(), sum);
        let ty = cx.indexed(BaseTy::Int(IntTy::I32), nu);
        let ty = cx.constr(pred, ty);
        let vars = cx.sorts([super::super::Sort::Int]);
        cx.exists(Binder::new(ty, vars))
    }

    #[test]
    fn identity_preserves_pointers() {
        let mut cx = Ctx::new();
        let ty = sample(&mut cx);
        let misses = cx.stats().misses;
        assert!(ty.fold_with(&mut Identity(&mut cx)).ptr_eq(&ty));
        assert_eq!(cx.stats().misses, misses);
    }

    #[test]
    fn fold_rebuilds_changed_spine() {
        let mut cx = Ctx::new();
        let ty = sample(&mut cx);
        let ty2 = ty.fold_with(&mut Succ(&mut cx));
        assert_eq!(ty2.to_string(), "{int. {i32[β0.0] | (β0.0 > (a0 + 2))}}");
        // the index is unchanged and thus shared
        let base = |ty: &Ty| match ty.kind() {
            TyKind::Exists(b) => b.value().base().cloned(),
            _ => None,
        };
        assert_eq!(base(&ty), base(&ty2));
    }

    #[test]
    fn visitors() {
        let mut cx = Ctx::new();
        let ty = sample(&mut cx);
        let fvars: FnvHashSet<_> = [Name::new(0)].into_iter().collect();
        assert_eq!(ty.fvars(), fvars);
        assert!(!ty.has_escaping_bvars());
        assert!(!ty.has_holes());
        assert!(ty.evars().is_empty());

        let TyKind::Exists(b) = ty.kind() else { panic!() };
        let body = b.value();
        assert!(body.has_escaping_bvars());
        assert!(!body.has_escaping_bvars_at_or_above(DebruijnIndex::from_u32(1)));

        let outer = cx.bvar(BoundVar::new(DebruijnIndex::from_u32(1), 0));
        let hole = cx.hole();
        let e = cx.tuple([outer, hole]);
        assert!(e.has_escaping_bvars() && e.has_holes());
    }

    #[test]
    fn containers() {
        let mut cx = Ctx::new();
        let e = cx.int(0);
        let pair = (Some(e.clone()), Vec::from([e.clone(), e]));
        let (o, v) = pair.fold_with(&mut Succ(&mut cx));
        let one = cx.int(1);
        assert_eq!(o, Some(one.clone()));
        assert!(v.iter().all(|x| x.ptr_eq(&one)));
    }
}
