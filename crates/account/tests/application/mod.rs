mod transfer_it;
