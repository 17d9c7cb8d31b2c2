//! Refinement holes and the kvars that replace them.

use super::{BaseTy, Binder, Ctx, Expr, ExprKind, List, Sort, Ty, TyKind, TypeFoldable, TypeFolder};
use crate::{BoundVar, DebruijnIndex, KVid, KVidGen};
use alloc::vec::Vec;
use itertools::Itertools;

/// Declarations of kvars, namely the sorts of their arguments.
///
/// ~~~
/// # use refterm::rc::{Ctx, KVarStore, Sort};
/// let mut cx = Ctx::new();
/// let mut kvars = KVarStore::new();
/// let pair = cx.tuple_sort([Sort::Int, Sort::Bool]);
/// let func = cx.func_sort([Sort::Int], Sort::Bool);
/// let scope = [cx.sorts([Sort::Int]), cx.sorts([pair, func])];
///
/// let k = kvars.fresh(&mut cx, &scope);
/// assert_eq!(k.to_string(), "$0(β1.0, β0.0.0, β0.0.1)");
/// assert_eq!(kvars.get(refterm::KVid::new(0)).unwrap().len(), 3);
/// ~~~
#[derive(Clone, Debug, Default)]
pub struct KVarStore {
    gen: KVidGen,
    decls: Vec<List<Sort>>,
}

impl KVarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new kvar and apply it to all variables in scope.
    ///
    /// The scope holds the variable sorts of the binders
    /// under which the kvar application is placed, outermost first.
    /// Variables of tuple sort are passed component-wise,
    /// variables of function sort are not passed.
    pub fn fresh(&mut self, cx: &mut Ctx, scope: &[List<Sort>]) -> Expr {
        let mut args = Vec::new();
        let mut sorts = Vec::new();
        for (depth, vars) in (0..scope.len() as u32).rev().zip(scope) {
            for (index, sort) in (0..).zip(vars.iter()) {
                let debruijn = DebruijnIndex::from_u32(depth);
                let bvar = cx.bvar(BoundVar::new(debruijn, index));
                flatten(cx, bvar, sort, &mut args, &mut sorts);
            }
        }
        let kvid = self.gen.fresh();
        let sorts = cx.sorts(sorts);
        trace!("declare {} over ({})", kvid, sorts.iter().format(", "));
        self.decls.push(sorts);
        cx.kvar(kvid, args)
    }

    /// Return the argument sorts of a kvar.
    pub fn get(&self, kvid: KVid) -> Option<&List<Sort>> {
        self.decls.get(kvid.as_u32() as usize)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

fn flatten(cx: &mut Ctx, e: Expr, sort: &Sort, args: &mut Vec<Expr>, sorts: &mut Vec<Sort>) {
    match sort {
        Sort::Tuple(components) => {
            for (field, sort) in (0..).zip(components.iter()) {
                let proj = cx.proj(e.clone(), field);
                flatten(cx, proj, sort, args, sorts)
            }
        }
        Sort::Func(_) => (),
        Sort::Int | Sort::Bool | Sort::Loc => {
            args.push(e);
            sorts.push(sort.clone())
        }
    }
}

pub(crate) struct ReplaceHoles<'a, F> {
    cx: &'a mut Ctx,
    f: F,
    scope: Vec<List<Sort>>,
}

impl<'a, F> ReplaceHoles<'a, F> {
    pub(crate) fn new(cx: &'a mut Ctx, f: F) -> Self {
        let scope = Vec::new();
        Self { cx, f, scope }
    }
}

impl<F> TypeFolder for ReplaceHoles<'_, F>
where
    F: FnMut(&mut Ctx, &[List<Sort>]) -> Expr,
{
    fn cx(&mut self) -> &mut Ctx {
        self.cx
    }

    fn fold_binder<T: TypeFoldable>(&mut self, t: &Binder<T>) -> Binder<T> {
        self.scope.push(t.vars().clone());
        let t = t.super_fold_with(self);
        self.scope.pop();
        t
    }

    fn fold_expr(&mut self, e: &Expr) -> Expr {
        match e.kind() {
            ExprKind::Hole => (self.f)(self.cx, &self.scope),
            _ => e.super_fold_with(self),
        }
    }
}

pub(crate) struct WithHoles<'a> {
    pub(crate) cx: &'a mut Ctx,
}

impl WithHoles<'_> {
    /// Construct `{v: sort(b). {b[v] | *}}`.
    fn hole_ty(&mut self, bty: &BaseTy) -> Ty {
        let bty = bty.fold_with(self);
        let vars = self.cx.sorts([bty.sort()]);
        let nu = self.cx.nu();
        let hole = self.cx.hole();
        let ty = self.cx.indexed(bty, nu);
        let ty = self.cx.constr(hole, ty);
        self.cx.exists(Binder::new(ty, vars))
    }
}

impl TypeFolder for WithHoles<'_> {
    fn cx(&mut self) -> &mut Ctx {
        self.cx
    }

    fn fold_ty(&mut self, ty: &Ty) -> Ty {
        match ty.kind() {
            TyKind::Indexed(bty, _) => self.hole_ty(bty),
            TyKind::Exists(b) => match b.value().base() {
                Some(bty) => self.hole_ty(bty),
                None => ty.super_fold_with(self),
            },
            TyKind::Constr(_, ty) => ty.fold_with(self),
            _ => ty.super_fold_with(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IntTy, Name, RefKind};
    use super::super::TypeVisitable;
    use alloc::string::ToString;

    /// `&Vec<{v: int. {i32[v] | v > 0}}>[a0]`
    fn sample(cx: &mut Ctx) -> Ty {
        let nu = cx.nu();
        let zero = cx.int(0);
        let pos = cx.gt(nu.clone(), zero);
        let int = cx.indexed(BaseTy::Int(IntTy::I32), nu);
        let int = cx.constr(pos, int);
        let vars = cx.sorts([Sort::Int]);
        let int = cx.exists(Binder::new(int, vars));
        let vec = cx.adt_def("Vec", Sort::Int);
        let vec = cx.adt(vec, [int]);
        let n = cx.fvar(Name::new(0));
        let ty = cx.indexed(vec, n);
        cx.mk_ref(RefKind::Mut, ty)
    }

    #[test]
    fn with_holes() {
        let mut cx = Ctx::new();
        let ty = sample(&mut cx).with_holes(&mut cx);
        let expected = "&mut {int. {Vec<{int. {i32[β0.0] | *}}>[β0.0] | *}}";
        assert_eq!(ty.to_string(), expected);
        assert!(ty.fvars().is_empty());
        // dropping refinements is idempotent
        assert!(ty.with_holes(&mut cx).ptr_eq(&ty));
    }

    #[test]
    fn replace_holes() {
        let mut cx = Ctx::new();
        let mut kvars = KVarStore::new();
        let ty = sample(&mut cx).with_holes(&mut cx);
        let mut scopes = Vec::new();
        let ty = ty.replace_holes(&mut cx, |cx, scope| {
            scopes.push(scope.len());
            kvars.fresh(cx, scope)
        });
        assert!(!ty.has_holes());
        assert_eq!(kvars.len(), 2);
        // the outer hole is visited first
        assert_eq!(scopes, [1, 2]);
        let expected = "&mut {int. {Vec<{int. {i32[β0.0] | $1(β1.0, β0.0)}}>[β0.0] | $0(β0.0)}}";
        assert_eq!(ty.to_string(), expected);
    }

    #[test]
    fn fresh_without_scope() {
        let mut cx = Ctx::new();
        let mut kvars = KVarStore::new();
        let k = kvars.fresh(&mut cx, &[]);
        assert_eq!(k.to_string(), "$0()");
        assert_eq!(kvars.get(KVid::new(0)).map(|s| s.len()), Some(0));
        assert!(kvars.get(KVid::new(1)).is_none());
    }
}
