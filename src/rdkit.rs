//! RDKit standardization via pyo3

use pyo3::{
    prelude::PyAnyMethods,
    types::{IntoPyDict, PyModule},
    Py, PyAny, PyResult, Python,
};

/// Silence RDKit's per-molecule warning log. Bad input lines are expected
/// and show up in the run counts instead.
pub fn disable_rdkit_logs() -> PyResult<()> {
    Python::with_gil(|py| {
        PyModule::import_bound(py, "rdkit.RDLogger")?
            .call_method1("DisableLog", ("rdApp.*",))?;
        Ok(())
    })
}

/// Wraps RDKit's `rdMolStandardize` helpers. The helpers are constructed
/// once and reused for every input line.
pub struct Preprocessor {
    normalizer: Py<PyAny>,
    fragment_chooser: Py<PyAny>,
    uncharger: Py<PyAny>,
}

impl Preprocessor {
    pub fn new() -> PyResult<Self> {
        Python::with_gil(|py| {
            let standardize = PyModule::import_bound(
                py,
                "rdkit.Chem.MolStandardize.rdMolStandardize",
            )?;
            Ok(Self {
                normalizer: standardize.call_method0("Normalizer")?.unbind(),
                fragment_chooser: standardize
                    .call_method0("LargestFragmentChooser")?
                    .unbind(),
                uncharger: standardize.call_method0("Uncharger")?.unbind(),
            })
        })
    }

    /// Parse `smi`, normalize functional groups, keep the largest fragment,
    /// remove any net charge, and reserialize canonically without
    /// stereochemistry. Anything RDKit cannot parse comes back as `None`,
    /// and no Python error escapes this call.
    pub fn process(&self, smi: &str) -> Option<String> {
        // RDKit parses the empty string as an empty molecule and would
        // serialize it back to "", so reject blank lines up front
        if smi.trim().is_empty() {
            return None;
        }
        Python::with_gil(|py| self.standardize(py, smi).ok().flatten())
    }

    fn standardize(&self, py: Python<'_>, smi: &str) -> PyResult<Option<String>> {
        let chem = PyModule::import_bound(py, "rdkit.Chem")?;
        let mol = chem.call_method1("MolFromSmiles", (smi,))?;
        if mol.is_none() {
            return Ok(None);
        }
        let mol = self.normalizer.bind(py).call_method1("normalize", (mol,))?;
        let mol = self
            .fragment_chooser
            .bind(py)
            .call_method1("choose", (mol,))?;
        let mol = self.uncharger.bind(py).call_method1("uncharge", (mol,))?;
        let kwargs =
            [("isomericSmiles", false), ("canonical", true)].into_py_dict_bound(py);
        let smi = chem
            .call_method("MolToSmiles", (mol,), Some(&kwargs))?
            .extract()?;
        Ok(Some(smi))
    }
}
