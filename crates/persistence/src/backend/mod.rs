// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-specific connection setup.
//!
//! Everything that Diesel cannot express through its DSL (PRAGMA statements,
//! `last_insert_rowid()`) lives here. Queries and mutations stay in
//! `queries/` and `mutations/`.

pub mod sqlite;
