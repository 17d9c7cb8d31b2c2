#![no_std]
#![forbid(unsafe_code)]

//! Interned refinement terms with generic fold, visit and substitution.
//!
//! Refinement types decorate ordinary types with logical predicates,
//! such as `{v: int. {i32[v] | v > 0}}`, the type of positive 32-bit integers.
//! This library provides a term representation for such types and
//! for the expressions and sorts occurring in them.
//!
//! # Usage
//!
//! All compound terms are created by a store, the context [`rc::Ctx`].
//! The store *interns* terms:
//! structurally equal terms that were created by the same store
//! share one allocation, which makes cloning, hashing and
//! equality checking of terms constant-time operations.
//!
//! Terms are transformed by *folding* and inspected by *visiting*.
//! On top of this, the library implements
//! shifting and substitution of de Bruijn indices,
//! unification of existential variables,
//! replacement of refinement holes by kvars,
//! normalisation, and sort checking.
//!
//! The following example parses a type, then
//! instantiates its binder with a free variable and
//! checks that the result is well-sorted.
//!
//! ~~~
//! # use refterm::Error;
//! use refterm::rc::{Ctx, Scope, Sort, TyKind, TypeVisitable, Wf};
//!
//! let mut cx = Ctx::new();
//! let mut scope = Scope::new();
//! scope.declare("n", Sort::Int)?;
//!
//! let ty = scope.ty(&mut cx, "{v: int. {i32[v] | v >= n}}")?;
//! let TyKind::Exists(binder) = ty.kind() else { panic!() };
//!
//! // replace the bound variable `v` by a fresh free variable
//! let v = scope.declare("v", Sort::Int)?;
//! let v = cx.fvar(v);
//! let inst = binder.instantiate(&mut cx, &[v])?;
//! assert_eq!(inst, scope.ty(&mut cx, "{i32[v] | v >= n}")?);
//! assert_eq!(inst.fvars().len(), 2);
//!
//! Wf::new(scope.sort_env()).check_ty(&mut cx, &inst)?;
//! # Ok::<_, Error>(())
//! ~~~
//!
//! # Organisation
//!
//! * The [`rc`] and [`arc`] modules contain the store and
//!   all data structures that contain interned terms.
//! * The crate root contains data structures without interned terms,
//!   such as variables, operators and errors.
//! * The [`refterm_parse`] crate parses text to syntax trees,
//!   which are lowered to terms by [`rc::Scope`].
//!
//! The [`rc`] and [`arc`] modules expose completely the same API,
//! the difference being that the terms in [`rc`]
//! cannot be shared between threads.
//! Due to the performance overhead incurred by atomic reference counting,
//! it is advisable to use [`arc`] only in multi-threaded scenarios,
//! and to prefer [`rc`] whenever possible.
//! Interning is never concurrent:
//! every store is owned by a single thread and
//! interns terms via a mutable reference.

extern crate alloc;
#[macro_use]
extern crate log;

/// Multi-threading kernel.
#[cfg(not(doctest))]
pub mod arc;
/// Single-threading kernel.
pub mod rc;

pub mod error;
mod op;
mod prim;
mod stack;
mod var;

pub use error::Error;
pub use op::{BinOp, Constant, UnOp};
pub use prim::{IntTy, RefKind, UintTy};
pub use stack::Stack;
pub use var::{BoundVar, DebruijnIndex, EVar, EVarGen, KVid, KVidGen, Name, NameGen, ParamTy};
