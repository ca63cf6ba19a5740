use core::ptr::NonNull;

use stratum::{
    emplace, rebind, AllocError, Allocator, PoolAllocator, PoolConfig, Propagation, Rebind, Release,
    StackAllocator, SystemAllocator,
};

struct Node<T> {
    value: T,
    next: Option<NonNull<Node<T>>>,
}

/// A minimal singly linked stack written only against the allocator contract.
struct NodeList<T, A: Allocator<Node<T>>> {
    head: Option<NonNull<Node<T>>>,
    len: usize,
    alloc: A,
}

impl<T, A: Allocator<Node<T>>> NodeList<T, A> {
    fn new_in<B>(alloc: &B) -> Self
    where
        B: Rebind<Node<T>, Output = A>,
    {
        Self {
            head: None,
            len: 0,
            alloc: alloc.rebind(),
        }
    }

    fn push(&mut self, value: T) -> Result<NonNull<Node<T>>, AllocError> {
        let node = emplace(&self.alloc, Node { value, next: self.head })?;
        self.head = Some(node);
        self.len += 1;
        Ok(node)
    }

    fn pop(&mut self) -> Option<(T, Release)> {
        let node = self.head?;
        let Node { value, next } = unsafe { node.as_ptr().read() };
        self.head = next;
        self.len -= 1;
        let release = unsafe { self.alloc.deallocate(node, 1) }.ok()?;
        Some((value, release))
    }

    fn allocator(&self) -> &A {
        &self.alloc
    }
}

impl<T, A: Allocator<Node<T>>> Drop for NodeList<T, A> {
    fn drop(&mut self) {
        while self.pop().is_some() {}
    }
}

#[test]
fn test_list_over_pool_recycles_nodes() -> anyhow::Result<()> {
    let pool = PoolAllocator::<u32>::with_config(PoolConfig::default().with_blocks_per_chunk(4))?;
    let mut list: NodeList<u32, _> = NodeList::new_in(&pool);

    for i in 0..3 {
        list.push(i)?;
    }
    assert_eq!(list.allocator().allocated_count(), 3);
    // The element pool is untouched; nodes come from the rebound pool.
    assert_eq!(pool.chunk_count(), 0);

    let top = list.head;
    assert_eq!(list.pop(), Some((2, Release::Recycled)));
    assert_eq!(list.len, 2);

    // LIFO reuse hands the freed node straight back.
    assert_eq!(Some(list.push(7)?), top);
    assert_eq!(list.pop().map(|(v, _)| v), Some(7));
    assert_eq!(list.pop().map(|(v, _)| v), Some(1));
    assert_eq!(list.pop().map(|(v, _)| v), Some(0));
    assert!(list.pop().is_none());
    assert_eq!(list.allocator().allocated_count(), 0);
    Ok(())
}

#[test]
fn test_list_over_stack_shares_buffer() -> anyhow::Result<()> {
    let stack = StackAllocator::<String>::new(1024)?;
    let marker = stack.get_marker();
    {
        let mut list: NodeList<String, _> = NodeList::new_in(&stack);
        assert!(*list.allocator() == stack);
        assert_eq!(stack.ref_count(), 2);

        list.push(String::from("a"))?;
        list.push(String::from("b"))?;
        assert!(stack.used_size() > 0);

        let (value, release) = list.pop().ok_or_else(|| anyhow::anyhow!("list is empty"))?;
        assert_eq!(value, "b");
        assert_eq!(release, Release::Deferred);
    }
    assert_eq!(stack.ref_count(), 1);
    assert!(stack.used_size() > 0);
    stack.free_to_marker(marker)?;
    assert_eq!(stack.used_size(), 0);
    Ok(())
}

#[test]
fn test_list_over_system_allocator() -> anyhow::Result<()> {
    let system = SystemAllocator::<u8>::new();
    let mut list: NodeList<Vec<u8>, _> = NodeList::new_in(&system);
    list.push(vec![1, 2, 3])?;
    list.push(Vec::new())?;
    assert_eq!(list.len, 2);
    Ok(())
}

#[test]
fn test_rebind_identity() {
    let stack = StackAllocator::<u32>::new(64).unwrap();
    let round_trip = rebind::<u32, _>(&rebind::<Node<u32>, _>(&stack));
    assert!(round_trip == stack);

    let pool = PoolAllocator::<u32>::new();
    let rebound = rebind::<Node<u32>, _>(&pool);
    assert!(rebound != pool);
    assert_eq!(rebound.config(), pool.config());

    let system = SystemAllocator::<u32>::new();
    assert!(rebind::<Node<u32>, _>(&system) == system);
}

#[test]
fn test_propagation_traits() {
    assert_eq!(<PoolAllocator<u8> as Allocator<u8>>::PROPAGATION, Propagation::NONE);
    assert_eq!(<SystemAllocator<u8> as Allocator<u8>>::PROPAGATION, Propagation::ALL);
}
