//! Store and terms, generic over the reference-counting pointer.

use super::Rc;

mod binder;
mod ctx;
mod evars;
mod expr;
pub mod fold;
mod intern;
mod kvars;
mod normalize;
mod scope;
mod sort;
mod subst;
mod ty;
mod wf;

pub use binder::Binder;
pub use ctx::{Ctx, Internable, SliceInternable};
pub use evars::{EVarSnapshot, EVarSol, EVarStore};
pub use expr::{Expr, ExprKind, KVar};
pub use fold::{FallibleTypeFolder, TypeFoldable, TypeFolder, TypeVisitable, TypeVisitor};
pub use intern::{InternStats, Interned, Interner, List};
pub use kvars::KVarStore;
pub use scope::Scope;
pub use sort::Sort;
pub use subst::FVarSubst;
pub use ty::{AdtDef, AdtDefData, BaseTy, FnSig, PolyFnSig, Ty, TyKind};
pub use wf::{SortEnv, Wf};
