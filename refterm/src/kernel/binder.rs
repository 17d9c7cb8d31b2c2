use super::{List, Sort};

/// Value that may refer to variables bound by the binder.
///
/// Inside `value`, the `i`-th variable of the binder is
/// the bound variable with index `i` and de Bruijn index 0,
/// counted from the binder.
/// The variable has the `i`-th sort of `vars`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Binder<T> {
    vars: List<Sort>,
    value: T,
}

impl<T> Binder<T> {
    pub fn new(value: T, vars: List<Sort>) -> Self {
        Self { vars, value }
    }

    /// Bind the variables with the given sorts in `value`.
    ///
    /// ~~~
    /// # use refterm::rc::{Binder, Ctx, Sort};
    /// let mut cx = Ctx::new();
    /// let vars = cx.sorts([Sort::Int, Sort::Bool]);
    /// let nu = cx.nu();
    /// let b = Binder::bind_with_vars(nu, vars);
    /// assert_eq!(b.vars().len(), 2);
    /// assert_eq!(b.map(|e| e.to_string()).skip_binder(), "β0.0");
    /// ~~~
    pub fn bind_with_vars(value: T, vars: List<Sort>) -> Self {
        Self::new(value, vars)
    }

    pub fn vars(&self) -> &List<Sort> {
        &self.vars
    }

    /// Borrow the value, whose bound variables become escaping.
    ///
    /// Unlike [`Binder::as_ref`], this does not touch the sorts.
    ///
    /// ~~~
    /// # use refterm::rc::{Binder, Ctx, Sort};
    /// let mut cx = Ctx::new();
    /// let b = Binder::new(cx.nu(), cx.sorts([Sort::Int]));
    /// assert!(b.value().ptr_eq(&cx.nu()));
    /// assert_eq!(b.value(), b.as_ref().skip_binder());
    /// ~~~
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Return the value, whose bound variables become escaping.
    pub fn skip_binder(self) -> T {
        self.value
    }

    pub fn as_ref(&self) -> Binder<&T> {
        Binder::new(&self.value, self.vars.clone())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Binder<U> {
        Binder::new(f(self.value), self.vars)
    }
}
