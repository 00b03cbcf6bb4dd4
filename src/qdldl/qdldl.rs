#![allow(non_snake_case)]
use crate::algebra::*;
use core::cmp::{max, min};
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes returnable from [`QDLDLFactorisation`](QDLDLFactorisation) factor operations

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QDLDLError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix has a zero column")]
    EmptyColumn,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix factorization produced a zero pivot at index {0}")]
    ZeroPivot(usize),
    #[error("Matrix factorization produced a non-finite pivot at index {0}")]
    NonFinitePivot(usize),
    #[error("Invalid permutation vector")]
    InvalidPermutation,
    #[error("AMD ordering failed")]
    OrderingFailed,
}

/// Required settings for [`QDLDLFactorisation`](QDLDLFactorisation)

#[derive(Builder, Debug, Clone)]
pub struct QDLDLSettings<T: FloatT> {
    /// scaling of the AMD dense row threshold
    #[builder(default = "1.0")]
    pub amd_dense_scale: f64,
    /// user supplied ordering.  AMD is used if `None`
    #[builder(default = "None", setter(strip_option))]
    pub perm: Option<Vec<usize>>,
    /// pivots with magnitude at or below this value are treated as zero
    #[builder(default = "T::zero()")]
    pub pivot_tolerance: T,
}

impl<T> Default for QDLDLSettings<T>
where
    T: FloatT,
{
    fn default() -> QDLDLSettings<T> {
        QDLDLSettingsBuilder::<T>::default().build().unwrap()
    }
}

/// Performs $LDL^T$ factorization of a symmetric matrix held as its upper triangle

#[derive(Debug)]
pub struct QDLDLFactorisation<T = f64> {
    // permutation vector
    pub perm: Vec<usize>,
    // lower triangular factor
    pub L: CscMatrix<T>,
    // D and is inverse for A = LDL^T
    pub D: Vec<T>,
    pub Dinv: Vec<T>,
    // workspace data
    workspace: QDLDLWorkspace<T>,
    pivot_tolerance: T,
}

impl<T> QDLDLFactorisation<T>
where
    T: FloatT,
{
    pub fn new(
        Ain: &CscMatrix<T>,
        opts: Option<QDLDLSettings<T>>,
    ) -> Result<QDLDLFactorisation<T>, QDLDLError> {
        //sanity check on structure
        check_structure(Ain)?;
        _qdldl_new(Ain, opts)
    }

    /// number of positive entries in D
    pub fn positive_inertia(&self) -> usize {
        self.workspace.positive_inertia
    }

    /// number of negative entries in D
    pub fn negative_inertia(&self) -> usize {
        self.workspace.negative_inertia
    }

    // Solves Ax = b using LDL factors for A.
    // Solves in place (x replaces b)
    pub fn solve(&mut self, b: &mut [T]) {
        // bomb if b is the wrong size
        assert_eq!(b.len(), self.D.len());

        // permute b
        let tmp = &mut self.workspace.fwork;
        _permute(tmp, b, &self.perm);

        //solve in place with tmp as permuted RHS
        _solve(
            &self.L.colptr,
            &self.L.rowval,
            &self.L.nzval,
            &self.Dinv,
            tmp,
        );

        // inverse permutation to put unpermuted soln in b
        _ipermute(b, tmp, &self.perm);
    }

    /// Replace every value of the factored matrix with the entries
    /// of `values`, given in the order of the `nzval` field of the
    /// original input.  Call [`refactor`](Self::refactor) afterwards.
    pub fn update_values(&mut self, values: &[T]) {
        let nzval = &mut self.workspace.triuA.nzval; // post perm internal data
        let AtoPAPt = &self.workspace.AtoPAPt; //mapping from input matrix entries to triuA
        assert_eq!(values.len(), AtoPAPt.len());

        for (&idx, &v) in zip(AtoPAPt, values) {
            nzval[idx] = v;
        }
    }

    pub fn refactor(&mut self) -> Result<(), QDLDLError> {
        _factor(
            &mut self.L,
            &mut self.D,
            &mut self.Dinv,
            &mut self.workspace,
            self.pivot_tolerance,
        )
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), QDLDLError> {
    if !A.is_square() {
        return Err(QDLDLError::IncompatibleDimension);
    }

    if !A.is_triu() {
        return Err(QDLDLError::NotUpperTriangular);
    }

    //Error if A doesn't have at least one entry in every column
    if !A.colptr.windows(2).all(|c| c[0] < c[1]) {
        return Err(QDLDLError::EmptyColumn);
    }

    Ok(())
}

fn _qdldl_new<T: FloatT>(
    Ain: &CscMatrix<T>,
    opts: Option<QDLDLSettings<T>>,
) -> Result<QDLDLFactorisation<T>, QDLDLError> {
    let n = Ain.nrows();

    //get default values if no options passed at all
    let opts = opts.unwrap_or_default();

    //Use AMD ordering if a user-provided ordering
    //is not supplied.   For no ordering at all, the
    //user would need to pass (0..n).collect() explicitly
    let (perm, iperm) = match opts.perm {
        Some(perm) => {
            let iperm = _invperm(&perm)?;
            (perm, iperm)
        }
        None => _get_amd_ordering(Ain, opts.amd_dense_scale)?,
    };

    //permute to (another) upper triangular matrix and store the
    //index mapping the input's entries to the permutation's entries
    let (A, AtoPAPt) = _permute_symmetric(Ain, &iperm);

    // allocate workspace
    let mut workspace = QDLDLWorkspace::<T>::new(A, AtoPAPt);

    //total nonzeros in factorization
    let sumLnz = workspace.Lnz.iter().sum();

    // allocate space for the L matrix row indices and data
    let mut L = CscMatrix::spalloc(n, n, sumLnz);

    // allocate for D and D inverse in LDL^T
    let mut D = vec![T::zero(); n];
    let mut Dinv = vec![T::zero(); n];

    // factor the matrix into A = LDL^T
    _factor(
        &mut L,
        &mut D,
        &mut Dinv,
        &mut workspace,
        opts.pivot_tolerance,
    )?;

    Ok(QDLDLFactorisation {
        perm,
        L,
        D,
        Dinv,
        workspace,
        pivot_tolerance: opts.pivot_tolerance,
    })
}

#[derive(Debug)]
struct QDLDLWorkspace<T> {
    // internal workspace data
    etree: Vec<usize>,
    Lnz: Vec<usize>,
    iwork: Vec<usize>,
    bwork: Vec<bool>,
    fwork: Vec<T>,

    // number of positive and negative values in D
    positive_inertia: usize,
    negative_inertia: usize,

    // The upper triangular matrix factorisation target
    // This is the post ordering PAPt of the original data
    triuA: CscMatrix<T>,

    // mapping from entries in the triu form
    // of the original input to the post ordering
    // triu form used for the factorization
    AtoPAPt: Vec<usize>,
}

impl<T> QDLDLWorkspace<T>
where
    T: FloatT,
{
    fn new(triuA: CscMatrix<T>, AtoPAPt: Vec<usize>) -> Self {
        let n = triuA.ncols();
        let mut etree = vec![0; n];
        let mut Lnz = vec![0; n]; //nonzeros in each L column
        let mut iwork = vec![0; n * 3];

        _etree(n, &triuA.colptr, &triuA.rowval, &mut iwork, &mut Lnz, &mut etree);

        Self {
            etree,
            Lnz,
            iwork,
            bwork: vec![false; n],
            fwork: vec![T::zero(); n],
            positive_inertia: 0,
            negative_inertia: 0,
            triuA,
            AtoPAPt,
        }
    }
}

fn _factor<T: FloatT>(
    L: &mut CscMatrix<T>,
    D: &mut [T],
    Dinv: &mut [T],
    workspace: &mut QDLDLWorkspace<T>,
    pivot_tolerance: T,
) -> Result<(), QDLDLError> {
    let A = &workspace.triuA;

    // the inertia is unknown until the factorization completes
    workspace.positive_inertia = 0;
    workspace.negative_inertia = 0;

    let npos = _factor_inner(
        A.n,
        &A.colptr,
        &A.rowval,
        &A.nzval,
        &mut L.colptr,
        &mut L.rowval,
        &mut L.nzval,
        D,
        Dinv,
        &workspace.Lnz,
        &workspace.etree,
        &mut workspace.bwork,
        &mut workspace.iwork,
        &mut workspace.fwork,
        pivot_tolerance,
    )?;

    workspace.positive_inertia = npos;
    workspace.negative_inertia = A.n - npos;

    Ok(())
}

const QDLDL_UNKNOWN: usize = usize::MAX;
const QDLDL_USED: bool = true;
const QDLDL_UNUSED: bool = false;

// Compute the elimination tree for a symmetric matrix
// in compressed sparse column form.

fn _etree(n: usize, Ap: &[usize], Ai: &[usize], work: &mut [usize], Lnz: &mut [usize], etree: &mut [usize]) {
    // zero out Lnz and work.  Set all etree values to unknown
    work.fill(0);
    Lnz.fill(0);
    etree.fill(QDLDL_UNKNOWN);

    for j in 0..n {
        work[j] = j;
        for &istart in &Ai[Ap[j]..Ap[j + 1]] {
            let mut i = istart;

            while work[i] != j {
                if etree[i] == QDLDL_UNKNOWN {
                    etree[i] = j;
                }
                Lnz[i] += 1; // nonzeros in this column
                work[i] = j;
                i = etree[i];
            }
        }
    }
}

fn _check_pivot<T: FloatT>(d: T, k: usize, pivot_tolerance: T) -> Result<(), QDLDLError> {
    if !d.is_finite() {
        return Err(QDLDLError::NonFinitePivot(k));
    }
    if d.abs() <= pivot_tolerance {
        return Err(QDLDLError::ZeroPivot(k));
    }
    Ok(())
}

// Numeric factorization.  Returns the number of positive pivots.
#[allow(clippy::too_many_arguments)]
fn _factor_inner<T: FloatT>(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    Ax: &[T],
    Lp: &mut [usize],
    Li: &mut [usize],
    Lx: &mut [T],
    D: &mut [T],
    Dinv: &mut [T],
    Lnz: &[usize],
    etree: &[usize],
    bwork: &mut [bool],
    iwork: &mut [usize],
    fwork: &mut [T],
    pivot_tolerance: T,
) -> Result<usize, QDLDLError> {
    let mut npos = 0;

    // partition working memory into pieces
    let y_markers = bwork;
    let (y_idx, iwork) = iwork.split_at_mut(n);
    let (elim_buffer, next_colspace) = iwork.split_at_mut(n);
    let y_vals = fwork;

    //set Lp to cumsum(Lnz), starting from zero
    Lp[0] = 0;
    let mut acc = 0;
    for (Lp, Lnz) in zip(&mut Lp[1..], Lnz) {
        *Lp = acc + Lnz;
        acc = *Lp;
    }

    y_markers.fill(QDLDL_UNUSED);
    y_vals.fill(T::zero());
    D.fill(T::zero());
    next_colspace.copy_from_slice(&Lp[0..Lp.len() - 1]);

    for k in 0..n {
        // For each k, solve y = L(0:(k-1),0:k-1))\b, where b is the
        // part of the kth column of A above the diagonal.  y is then
        // the kth row of L, with an implied '1' on the diagonal.

        let mut nnz_y = 0;

        // find where the nonzeros of this row of L will go
        for i in Ap[k]..Ap[k + 1] {
            let bidx = Ai[i];

            if bidx == k {
                D[k] = Ax[i];
                continue;
            }

            y_vals[bidx] = Ax[i];

            if y_markers[bidx] == QDLDL_UNUSED {
                y_markers[bidx] = QDLDL_USED;
                elim_buffer[0] = bidx;
                let mut nnz_e = 1;

                // walk up the elimination tree
                let mut next_idx = etree[bidx];
                while next_idx != QDLDL_UNKNOWN && next_idx < k {
                    if y_markers[next_idx] == QDLDL_USED {
                        break;
                    }
                    y_markers[next_idx] = QDLDL_USED;
                    elim_buffer[nnz_e] = next_idx;
                    next_idx = etree[next_idx];
                    nnz_e += 1;
                }

                // reverse the path into the current ordering
                while nnz_e != 0 {
                    nnz_e -= 1;
                    y_idx[nnz_y] = elim_buffer[nnz_e];
                    nnz_y += 1;
                }
            }
        }

        // compute the values in the kth row
        for i in (0..nnz_y).rev() {
            let cidx = y_idx[i];
            let tmp_idx = next_colspace[cidx];
            let y_vals_cidx = y_vals[cidx];

            for j in Lp[cidx]..tmp_idx {
                y_vals[Li[j]] -= Lx[j] * y_vals_cidx;
            }

            Lx[tmp_idx] = y_vals_cidx * Dinv[cidx];
            D[k] -= y_vals_cidx * Lx[tmp_idx];

            Li[tmp_idx] = k;
            next_colspace[cidx] += 1;

            y_vals[cidx] = T::zero();
            y_markers[cidx] = QDLDL_UNUSED;
        }

        // no pivoting, so a zero here means the ordered
        // matrix has no LDL^T factorization
        _check_pivot(D[k], k, pivot_tolerance)?;
        if D[k] > T::zero() {
            npos += 1;
        }
        Dinv[k] = T::recip(D[k]);
    }

    Ok(npos)
}

// Solves (L+I)x = b, with x replacing b
fn _lsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for i in 0..x.len() {
        let xi = x[i];
        let (f, l) = (Lp[i], Lp[i + 1]);
        for (&Lij, &Lxj) in zip(&Li[f..l], &Lx[f..l]) {
            x[Lij] -= Lxj * xi;
        }
    }
}

// Solves (L+I)'x = b, with x replacing b
fn _ltsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for i in (0..x.len()).rev() {
        let (f, l) = (Lp[i], Lp[i + 1]);
        let s = zip(&Li[f..l], &Lx[f..l]).fold(T::zero(), |s, (&Lij, &Lxj)| s + Lxj * x[Lij]);
        x[i] -= s;
    }
}

// Solves Ax = b where A has given LDL factors, with x replacing b
fn _solve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], Dinv: &[T], b: &mut [T]) {
    _lsolve(Lp, Li, Lx, b);
    zip(b.iter_mut(), Dinv).for_each(|(b, d)| *b *= *d);
    _ltsolve(Lp, Li, Lx, b);
}

// Construct an inverse permutation from a permutation
fn _invperm(p: &[usize]) -> Result<Vec<usize>, QDLDLError> {
    let mut b = vec![QDLDL_UNKNOWN; p.len()];

    for (i, &j) in p.iter().enumerate() {
        if j < p.len() && b[j] == QDLDL_UNKNOWN {
            b[j] = i;
        } else {
            return Err(QDLDLError::InvalidPermutation);
        }
    }
    Ok(b)
}

fn _permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

fn _ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

// Given a sparse symmetric matrix `A` (with only upper triangular entries), return
// permuted sparse symmetric matrix `P` (also only upper triangular) given the
// inverse permutation vector `iperm`, and the map from entries of A to P.
// See Davis, Direct Methods for Sparse Linear Systems.
fn _permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.nrows();
    let mut P = CscMatrix::<T>::spalloc(n, n, A.nnz());
    let mut AtoPAPt = vec![0; A.nnz()];

    // count the entries of each column of P
    let mut num_entries = vec![0; n];
    for colA in 0..n {
        let colP = iperm[colA];
        for &rowA in &A.rowval[A.colptr[colA]..A.colptr[colA + 1]] {
            let rowP = iperm[rowA];
            num_entries[max(rowP, colP)] += 1;
        }
    }

    // column pointers of P
    P.colptr[0] = 0;
    for k in 0..n {
        P.colptr[k + 1] = P.colptr[k] + num_entries[k];
    }

    // next free location in each column of P
    let mut row_starts = P.colptr[0..n].to_vec();

    for colA in 0..n {
        let colP = iperm[colA];
        for idxA in A.colptr[colA]..A.colptr[colA + 1] {
            let rowP = iperm[A.rowval[idxA]];
            let col_idx = max(colP, rowP);
            let idxP = row_starts[col_idx];

            // NB: rows within a column of P are not sorted
            P.rowval[idxP] = min(colP, rowP);
            P.nzval[idxP] = A.nzval[idxA];
            AtoPAPt[idxA] = idxP;
            row_starts[col_idx] += 1;
        }
    }
    (P, AtoPAPt)
}

fn _get_amd_ordering<T: FloatT>(
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> Result<(Vec<usize>, Vec<usize>), QDLDLError> {
    let mut control = amd::Control::default();
    control.dense *= amd_dense_scale;
    let (perm, iperm, _info) = amd::order(A.nrows(), &A.colptr, &A.rowval, &control)
        .map_err(|_| QDLDLError::OrderingFailed)?;
    Ok((perm, iperm))
}

//configure tests of internals
#[path = "test.rs"]
#[cfg(test)]
mod test;
