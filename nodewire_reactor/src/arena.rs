/*
 * Copyright © 2026, the nodewire authors.
 *
 * Licensed under the Apache License, Version 2.0 (the "License"); you may not use this
 * file except in compliance with the License. You may obtain a copy of the License at
 * http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
//! fixed-size slab pool: preallocate a fixed number of cells per slab, keep free
//! cells on a stack, grow by allocating another slab when the stack runs dry.
//! Used for actor-context objects (churned once per delivered message) and, on
//! completion backends, for in-flight operation descriptors.

const DEFAULT_POOL_SIZE: usize = 1024;

pub struct Arena<T> {
    pools: Vec<Box<[std::mem::MaybeUninit<T>]>>,
    free: Vec<(usize, usize)>, // (pool index, cell index)
    pool_size: usize,
    allocated: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::with_pool_size(DEFAULT_POOL_SIZE)
    }

    pub fn with_pool_size(pool_size: usize) -> Self {
        let mut arena = Arena { pools: Vec::new(), free: Vec::new(), pool_size, allocated: 0 };
        arena.grow();
        arena
    }

    fn grow(&mut self) {
        let pool_index = self.pools.len();
        let mut pool = Vec::with_capacity(self.pool_size);
        for _ in 0..self.pool_size {
            pool.push(std::mem::MaybeUninit::uninit());
        }
        self.pools.push(pool.into_boxed_slice());
        for cell in (0..self.pool_size).rev() {
            self.free.push((pool_index, cell));
        }
    }

    pub fn allocate(&mut self, value: T) -> ArenaBox<T> {
        if self.free.is_empty() {
            self.grow();
        }
        let (pool, cell) = self.free.pop().expect("grew above");
        self.pools[pool][cell].write(value);
        self.allocated += 1;
        ArenaBox::new(pool, cell)
    }

    /// reclaim a cell. The caller must not touch the value through `slot` again.
    pub fn deallocate(&mut self, slot: ArenaBox<T>) -> T {
        let value = unsafe { self.pools[slot.pool][slot.cell].assume_init_read() };
        self.free.push((slot.pool, slot.cell));
        self.allocated -= 1;
        value
    }

    pub fn get(&self, slot: &ArenaBox<T>) -> &T {
        unsafe { self.pools[slot.pool][slot.cell].assume_init_ref() }
    }

    pub fn get_mut(&mut self, slot: &ArenaBox<T>) -> &mut T {
        unsafe { self.pools[slot.pool][slot.cell].assume_init_mut() }
    }

    pub fn count(&self) -> usize {
        self.allocated
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// an opaque handle into an [`Arena`]; does not own the value (the arena does), and
/// must be returned via `Arena::deallocate` exactly once.
#[derive(Debug)]
pub struct ArenaBox<T> {
    pool: usize,
    cell: usize,
    #[allow(dead_code)]
    _marker: std::marker::PhantomData<fn() -> T>,
}

// constructed only by Arena::allocate above; redefine with the marker field wired up.
impl<T> ArenaBox<T> {
    fn new(pool: usize, cell: usize) -> Self {
        ArenaBox { pool, cell, _marker: std::marker::PhantomData }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_reuse() {
        let mut arena: Arena<u64> = Arena::with_pool_size(2);
        let a = arena.allocate(1);
        let b = arena.allocate(2);
        assert_eq!(arena.count(), 2);
        let va = arena.deallocate(a);
        assert_eq!(va, 1);
        assert_eq!(arena.count(), 1);
        let c = arena.allocate(3);
        assert_eq!(*arena.get(&c), 3);
        let _ = arena.deallocate(b);
        let _ = arena.deallocate(c);
        assert_eq!(arena.count(), 0);
    }

    #[test]
    fn grows_past_initial_pool() {
        let mut arena: Arena<u8> = Arena::with_pool_size(2);
        let boxes: Vec<_> = (0..10u8).map(|i| arena.allocate(i)).collect();
        assert_eq!(arena.count(), 10);
        for (i, b) in boxes.into_iter().enumerate() {
            assert_eq!(arena.deallocate(b), i as u8);
        }
    }
}
