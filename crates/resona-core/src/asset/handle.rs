// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::Asset;
use std::{ops::Deref, sync::Arc};

/// A thread-safe, reference-counted handle to a loaded asset.
///
/// Cloning a handle only increments the reference count. The asset data is
/// deallocated when the last handle is dropped, which is what keeps decoded
/// audio alive for as long as any sound instance is bound to it.
#[derive(Debug)]
pub struct AssetHandle<T: Asset>(Arc<T>);

impl<T: Asset> AssetHandle<T> {
    /// Creates a new `AssetHandle` that takes ownership of the asset data.
    pub fn new(asset: T) -> Self {
        Self(Arc::new(asset))
    }

    /// Returns `true` if both handles point to the same asset allocation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Returns the number of live handles to this asset.
    pub fn handle_count(this: &Self) -> usize {
        Arc::strong_count(&this.0)
    }
}

impl<T: Asset> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Asset> Deref for AssetHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blob(#[allow(dead_code)] Vec<i16>);
    impl Asset for Blob {}

    #[test]
    fn test_clone_shares_allocation() {
        let a = AssetHandle::new(Blob(vec![1, 2, 3]));
        let b = a.clone();
        assert!(AssetHandle::ptr_eq(&a, &b));
        assert_eq!(AssetHandle::handle_count(&a), 2);

        drop(b);
        assert_eq!(AssetHandle::handle_count(&a), 1);
    }

    #[test]
    fn test_distinct_assets_are_not_equal() {
        let a = AssetHandle::new(Blob(vec![1]));
        let b = AssetHandle::new(Blob(vec![1]));
        assert!(!AssetHandle::ptr_eq(&a, &b));
    }
}
