// Copyright 2025 Irreducible Inc.

use std::{
	ffi::OsString,
	fs::{self, File},
	io::{BufReader, BufWriter},
	path::{Path, PathBuf},
};

use rankone_field::CurveField;
use rankone_utils::{ensure, rayon::build_thread_pool};
use rayon::prelude::*;
use tracing::{debug, instrument};

use super::{read_part, Encoding, Error, Part, Sections};
use crate::constraint_system::{ConstraintSystem, R1C};

fn with_suffix(session: &Path, suffix: &str) -> PathBuf {
	let mut path = OsString::from(session.as_os_str());
	path.push(suffix);
	path.into()
}

/// The file holding everything but the constraints of a split system.
pub fn head_path(session: &Path) -> PathBuf {
	with_suffix(session, ".r1cs.E.save")
}

/// The file holding the constraints `start..end` of a split system.
pub fn body_path(session: &Path, start: usize, end: usize) -> PathBuf {
	with_suffix(session, &format!(".r1cs.Cons.{start}.{end}.save"))
}

/// Writes a file next to its final location and moves it into place once complete.
fn write_file<F: CurveField>(
	path: &Path,
	sections: Sections<'_, F>,
	encoding: Encoding,
) -> Result<u64, Error> {
	let mut tmp = path.as_os_str().to_owned();
	tmp.push(".tmp");
	let tmp = PathBuf::from(tmp);
	let written = sections.write(BufWriter::new(File::create(&tmp)?), encoding)?;
	fs::rename(&tmp, path)?;
	Ok(written)
}

impl<F: CurveField> ConstraintSystem<F> {
	/// Writes the system as one head file and one body file per `batch_size` stored constraints.
	///
	/// Files are named after `session`, see [`head_path`] and [`body_path`]. The last body file
	/// holds the remainder when `batch_size` does not divide the number of stored constraints.
	/// Returns the total number of bytes written.
	#[instrument("ConstraintSystem::split_dump", skip_all, level = "debug")]
	pub fn split_dump(
		&self,
		session: &Path,
		batch_size: usize,
		encoding: Encoding,
	) -> Result<u64, Error> {
		ensure!(batch_size > 0, Error::ZeroBatchSize);

		let (head, bodies) = rayon::join(
			|| write_file(&head_path(session), Sections::Head(&self.tables), encoding),
			|| {
				self.constraints
					.par_chunks(batch_size)
					.enumerate()
					.map(|(i, chunk)| {
						let start = i * batch_size;
						let path = body_path(session, start, start + chunk.len());
						write_file::<F>(&path, Sections::Body(chunk), encoding)
					})
					.try_reduce(|| 0, |a, b| Ok(a + b))
			},
		);
		let written = head? + bodies?;

		debug!(
			nb_constraints = self.constraints.len(),
			nb_bodies = self.constraints.len().div_ceil(batch_size),
			written,
			"dumped constraint system"
		);
		Ok(written)
	}

	/// Loads a system written by [`Self::split_dump`].
	///
	/// `total` is the number of stored constraints and `batch_size` the value used when dumping;
	/// together they determine the body files to read. The head and the bodies are read
	/// concurrently on a pool of `workers` threads, each body landing in its own disjoint slice of
	/// the constraint list.
	#[instrument("ConstraintSystem::load_from_split", skip_all, level = "debug")]
	pub fn load_from_split(
		session: &Path,
		total: usize,
		batch_size: usize,
		workers: usize,
		encoding: Encoding,
	) -> Result<Self, Error> {
		ensure!(batch_size > 0, Error::ZeroBatchSize);

		let pool = build_thread_pool(Some(workers.max(1)), "rankone-loader")?;
		let mut constraints = vec![R1C::default(); total];

		let (tables, bodies) = pool.install(|| {
			rayon::join(
				|| {
					let file = File::open(head_path(session))?;
					read_part(BufReader::new(file), encoding, F::CURVE, Part::Head, |encoding, bytes| {
						encoding.decode_tables::<F>(bytes)
					})
				},
				|| {
					constraints
						.par_chunks_mut(batch_size)
						.enumerate()
						.try_for_each(|(i, chunk)| {
							let start = i * batch_size;
							let path = body_path(session, start, start + chunk.len());
							let file = File::open(&path)?;
							let (body, _) = read_part(
								BufReader::new(file),
								encoding,
								F::CURVE,
								Part::Body,
								|encoding, bytes| encoding.decode_constraints(bytes),
							)?;
							ensure!(
								body.len() == chunk.len(),
								Error::ShardSizeMismatch {
									path,
									expected: chunk.len(),
									got: body.len(),
								}
							);
							for (slot, constraint) in chunk.iter_mut().zip(body) {
								*slot = constraint;
							}
							Ok::<_, Error>(())
						})
				},
			)
		});
		let (tables, _) = tables?;
		bodies?;

		debug!(nb_constraints = total, workers, "loaded constraint system");
		Ok(Self::from_parts(tables, constraints)?)
	}
}
