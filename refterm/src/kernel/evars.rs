//! Existential variables and their solution by unification.

use super::{BaseTy, Ctx, Expr, ExprKind, FallibleTypeFolder, Ty, TyKind, TypeFoldable, TypeVisitable};
use crate::error::EVarError as Error;
use crate::{EVar, EVarGen};
use alloc::string::ToString;
use fnv::{FnvBuildHasher, FnvHashMap};

type Solution = im::hashmap::HashMap<EVar, Expr, FnvBuildHasher>;

/// Generator of existential variables together with their partial solution.
///
/// ~~~
/// # use refterm::{rc::{Ctx, EVarStore, TypeFoldable}, Name};
/// let mut cx = Ctx::new();
/// let mut evars = EVarStore::new();
/// let (e1, e2) = (evars.fresh_expr(&mut cx), evars.fresh_expr(&mut cx));
/// let formal = cx.tuple([e1, e2.clone()]);
///
/// let x = cx.fvar(Name::new(0));
/// let two = cx.int(2);
/// let actual = cx.tuple([x.clone(), two]);
/// evars.unify_expr(&formal, &actual)?;
/// assert!(evars.unify_expr(&e2, &x).is_err());
///
/// let sol = evars.solve()?;
/// assert_eq!(formal.replace_evars(&mut cx, &sol)?, actual);
/// # Ok::<_, refterm::error::EVarError>(())
/// ~~~
#[derive(Clone, Debug, Default)]
pub struct EVarStore {
    gen: EVarGen,
    sol: Solution,
}

/// Solutions of an [`EVarStore`] at some point in time.
#[derive(Clone, Debug)]
pub struct EVarSnapshot(Solution);

/// Solution of all existential variables of an [`EVarStore`].
#[derive(Clone, Debug, Default)]
pub struct EVarSol {
    map: FnvHashMap<EVar, Expr>,
}

impl EVarSol {
    pub fn get(&self, evar: &EVar) -> Option<&Expr> {
        self.map.get(evar)
    }
}

impl EVarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> EVar {
        self.gen.fresh()
    }

    pub fn fresh_expr(&mut self, cx: &mut Ctx) -> Expr {
        cx.evar(self.fresh())
    }

    pub fn get(&self, evar: &EVar) -> Option<&Expr> {
        self.sol.get(evar)
    }

    /// Save the current solutions in constant time.
    pub fn snapshot(&self) -> EVarSnapshot {
        EVarSnapshot(self.sol.clone())
    }

    /// Restore the solutions of a snapshot.
    ///
    /// Variables generated after the snapshot stay generated,
    /// but lose their solutions.
    pub fn rollback(&mut self, snapshot: EVarSnapshot) {
        self.sol = snapshot.0
    }

    fn mismatch(formal: &Expr, actual: &Expr) -> Error {
        Error::Mismatch {
            formal: formal.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Solve existential variables in `formal` such that it equals `actual`.
    ///
    /// An existential variable is only solved by an expression
    /// without escaping bound variables and existential variables.
    pub fn unify_expr(&mut self, formal: &Expr, actual: &Expr) -> Result<(), Error> {
        debug!("unify {} with {}", formal, actual);
        match (formal.kind(), actual.kind()) {
            (ExprKind::EVar(evar), _) => {
                if let Some(sol) = self.sol.get(evar) {
                    return if sol == actual {
                        Ok(())
                    } else {
                        Err(Self::mismatch(sol, actual))
                    };
                }
                if !actual.has_escaping_bvars() && actual.evars().is_empty() {
                    debug!("solve {} := {}", evar, actual);
                    self.sol.insert(*evar, actual.clone());
                    Ok(())
                } else if formal == actual {
                    Ok(())
                } else {
                    Err(Self::mismatch(formal, actual))
                }
            }
            (ExprKind::Tuple(fs), ExprKind::Tuple(acts)) if fs.len() == acts.len() => {
                fs.iter().zip(acts).try_for_each(|(f, a)| self.unify_expr(f, a))
            }
            _ if formal == actual => Ok(()),
            _ => Err(Self::mismatch(formal, actual)),
        }
    }

    /// Solve existential variables in the indices of `formal`
    /// by unifying them with the corresponding indices of `actual`.
    ///
    /// Refinement predicates are ignored, as are
    /// positions where the shapes of the types differ.
    pub fn unify_ty(&mut self, formal: &Ty, actual: &Ty) -> Result<(), Error> {
        use TyKind::*;
        match (formal.kind(), actual.kind()) {
            (Indexed(b1, e1), Indexed(b2, e2)) => {
                self.unify_bty(b1, b2)?;
                self.unify_expr(e1, e2)
            }
            (Exists(t1), Exists(t2)) => {
                self.unify_ty(t1.value(), t2.value())
            }
            (Constr(_, t1), _) => self.unify_ty(t1, actual),
            (_, Constr(_, t2)) => self.unify_ty(formal, t2),
            (Tuple(ts1), Tuple(ts2)) if ts1.len() == ts2.len() => {
                ts1.iter().zip(ts2).try_for_each(|(t1, t2)| self.unify_ty(t1, t2))
            }
            (Ref(rk1, t1), Ref(rk2, t2)) if rk1 == rk2 => self.unify_ty(t1, t2),
            _ => Ok(()),
        }
    }

    fn unify_bty(&mut self, formal: &BaseTy, actual: &BaseTy) -> Result<(), Error> {
        match (formal, actual) {
            (BaseTy::Adt(d1, args1), BaseTy::Adt(d2, args2))
                if d1 == d2 && args1.len() == args2.len() =>
            {
                let mut args = args1.iter().zip(args2);
                args.try_for_each(|(t1, t2)| self.unify_ty(t1, t2))
            }
            _ => Ok(()),
        }
    }

    /// Return the solution if all generated variables are solved.
    pub fn solve(&self) -> Result<EVarSol, Error> {
        let map = self.gen.generated().map(|evar| match self.sol.get(&evar) {
            Some(e) => Ok((evar, e.clone())),
            None => Err(Error::Unsolved(evar)),
        });
        Ok(EVarSol {
            map: map.collect::<Result<_, _>>()?,
        })
    }
}

pub(crate) struct ReplaceEVars<'a> {
    cx: &'a mut Ctx,
    sol: &'a EVarSol,
}

impl<'a> ReplaceEVars<'a> {
    pub(crate) fn new(cx: &'a mut Ctx, sol: &'a EVarSol) -> Self {
        Self { cx, sol }
    }
}

impl FallibleTypeFolder for ReplaceEVars<'_> {
    type Error = Error;

    fn cx(&mut self) -> &mut Ctx {
        self.cx
    }

    // solutions are closed, so they need not be shifted below binders
    fn try_fold_expr(&mut self, e: &Expr) -> Result<Expr, Error> {
        match e.kind() {
            ExprKind::EVar(evar) => self.sol.get(evar).cloned().ok_or(Error::Unsolved(*evar)),
            _ => e.try_super_fold_with(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundVar, IntTy, Name, RefKind};
    use super::super::{Binder, Sort};

    fn i32_at(cx: &mut Ctx, e: Expr) -> Ty {
        cx.indexed(BaseTy::Int(IntTy::I32), e)
    }

    #[test]
    fn solved_evars_must_agree() {
        let mut cx = Ctx::new();
        let mut evars = EVarStore::new();
        let e = evars.fresh_expr(&mut cx);
        let (one, two) = (cx.int(1), cx.int(2));
        assert_eq!(evars.unify_expr(&e, &one), Ok(()));
        assert_eq!(evars.unify_expr(&e, &one), Ok(()));
        let err = evars.unify_expr(&e, &two);
        let expected = Error::Mismatch {
            formal: "1".into(),
            actual: "2".into(),
        };
        assert_eq!(err, Err(expected));
    }

    #[test]
    fn escaping_bvars_are_not_solutions() {
        let mut cx = Ctx::new();
        let mut evars = EVarStore::new();
        let e = evars.fresh_expr(&mut cx);
        let nu = cx.nu();
        assert!(evars.unify_expr(&e, &nu).is_err());
        assert!(evars.get(&EVar::new(0)).is_none());
        assert_eq!(evars.solve().map(|_| ()), Err(Error::Unsolved(EVar::new(0))));
    }

    #[test]
    fn types() -> Result<(), Error> {
        let mut cx = Ctx::new();
        let mut evars = EVarStore::new();
        let (e1, e2) = (evars.fresh_expr(&mut cx), evars.fresh_expr(&mut cx));

        // &(i32[?0], {i32[?1] | p})
        let t1 = i32_at(&mut cx, e1);
        let t2 = i32_at(&mut cx, e2);
        let p = cx.fvar(Name::new(9));
        let t2 = cx.constr(p, t2);
        let formal = cx.tuple_ty([t1, t2]);
        let formal = cx.mk_ref(RefKind::Shr, formal);

        // &(i32[a0], i32[a0 + 1])
        let x = cx.fvar(Name::new(0));
        let one = cx.int(1);
        let x1 = cx.add(x.clone(), one);
        let t1 = i32_at(&mut cx, x);
        let t2 = i32_at(&mut cx, x1);
        let actual = cx.tuple_ty([t1, t2]);
        let actual = cx.mk_ref(RefKind::Shr, actual);

        evars.unify_ty(&formal, &actual)?;
        let sol = evars.solve()?;
        let replaced = formal.replace_evars(&mut cx, &sol)?;
        assert_eq!(replaced.to_string(), "&(i32[a0], {i32[(a0 + 1)] | a9})");
        assert!(replaced.evars().is_empty());
        Ok(())
    }

    #[test]
    fn shape_mismatch_is_ignored() {
        let mut cx = Ctx::new();
        let mut evars = EVarStore::new();
        let e = evars.fresh_expr(&mut cx);
        let t = i32_at(&mut cx, e);
        let never = cx.never();
        assert_eq!(evars.unify_ty(&t, &never), Ok(()));
    }

    #[test]
    fn exists_bodies() {
        let mut cx = Ctx::new();
        let mut evars = EVarStore::new();
        let e = evars.fresh_expr(&mut cx);
        let vars = cx.sorts([Sort::Int]);
        let pair = cx.tuple([e.clone(), e]);
        let formal = i32_at(&mut cx, pair);
        let formal = cx.exists(Binder::new(formal, vars.clone()));

        let nu = cx.nu();
        let zero = cx.int(0);
        let pair = cx.tuple([zero, nu]);
        let actual = i32_at(&mut cx, pair);
        let actual = cx.exists(Binder::new(actual, vars));
        // `?0` is solved by `0`, which then mismatches the bound variable
        let err = evars.unify_ty(&formal, &actual);
        let expected = Error::Mismatch {
            formal: "0".into(),
            actual: BoundVar::NU.to_string(),
        };
        assert_eq!(err, Err(expected));
    }

    #[test]
    fn rollback() {
        let mut cx = Ctx::new();
        let mut evars = EVarStore::new();
        let e = evars.fresh_expr(&mut cx);
        let snapshot = evars.snapshot();
        let one = cx.int(1);
        evars.unify_expr(&e, &one).unwrap();
        assert!(evars.solve().is_ok());
        evars.rollback(snapshot);
        assert!(evars.solve().is_err());
        let two = cx.int(2);
        assert_eq!(evars.unify_expr(&e, &two), Ok(()));
    }
}
