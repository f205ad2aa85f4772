// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod audit;
mod storage;

pub use audit::persist_audit_event;
pub use storage::write_payload;
